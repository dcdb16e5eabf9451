//! Mock bench hardware for integration tests.
//!
//! Records every port call so tests can assert on pin history, open
//! descriptors, and event traffic without touching real hardware.  The
//! jumper map mirrors the carrier: an input reads whatever its bridged
//! partner was last driven to.

use std::collections::{HashMap, HashSet};

use boardcheck::app::events::HarnessEvent;
use boardcheck::app::ports::{
    ConnectedNetwork, EventSink, GpioPort, Level, PinId, RawGpio, RawSerial, ScanList,
    ScannedNetwork, SerialPort, StoreOutcome, TimePort, WifiPort,
};
use boardcheck::config::TestPlan;
use boardcheck::{GpioError, SerialError, WifiError};

// ── MockBench ─────────────────────────────────────────────────

pub struct MockBench {
    partner: HashMap<PinId, PinId>,
    /// Full drive history per pin, oldest first.
    pub history: HashMap<PinId, Vec<Level>>,
    /// Forced input readings (buttons, broken jumpers).
    pub overrides: HashMap<PinId, Level>,
    open: HashMap<i32, PinId>,
    next: i32,
    /// Pins whose open fails.
    pub fail_open: HashSet<PinId>,
    /// Pins whose reads fail.
    pub fail_read: HashSet<PinId>,
    pub gpio_closes: u32,
    // Serial side
    uart_rx: HashMap<i32, Vec<u8>>,
    pub uart_open: HashSet<i32>,
    pub uart_closes: u32,
    /// Swallow the UART echo entirely.
    pub uart_mute: bool,
}

impl MockBench {
    pub fn new(plan: &TestPlan) -> Self {
        let mut partner = HashMap::new();
        for pair in &plan.gpio_pairs {
            partner.insert(pair.drive, pair.sense);
            partner.insert(pair.sense, pair.drive);
        }
        Self {
            partner,
            history: HashMap::new(),
            overrides: HashMap::new(),
            open: HashMap::new(),
            next: 0,
            fail_open: HashSet::new(),
            fail_read: HashSet::new(),
            gpio_closes: 0,
            uart_rx: HashMap::new(),
            uart_open: HashSet::new(),
            uart_closes: 0,
            uart_mute: false,
        }
    }

    /// Number of GPIO descriptors currently open.
    pub fn open_gpio_count(&self) -> usize {
        self.open.len()
    }

    /// Latest driven level on `pin`.
    pub fn level_of(&self, pin: PinId) -> Option<Level> {
        self.history.get(&pin).and_then(|h| h.last()).copied()
    }

    /// Press (or release) a button input.
    pub fn set_input(&mut self, pin: PinId, level: Level) {
        self.overrides.insert(pin, level);
    }
}

impl GpioPort for MockBench {
    fn open_output(&mut self, pin: PinId, initial: Level) -> Result<RawGpio, GpioError> {
        if self.fail_open.contains(&pin) {
            return Err(GpioError::OpenFailed { pin, rc: -1 });
        }
        self.history.entry(pin).or_default().push(initial);
        self.next += 1;
        self.open.insert(self.next, pin);
        Ok(RawGpio(self.next))
    }

    fn open_input(&mut self, pin: PinId) -> Result<RawGpio, GpioError> {
        if self.fail_open.contains(&pin) {
            return Err(GpioError::OpenFailed { pin, rc: -1 });
        }
        self.next += 1;
        self.open.insert(self.next, pin);
        Ok(RawGpio(self.next))
    }

    fn set_level(&mut self, raw: RawGpio, level: Level) -> Result<(), GpioError> {
        let pin = *self
            .open
            .get(&raw.0)
            .ok_or(GpioError::Released { pin: raw.0 })?;
        self.history.entry(pin).or_default().push(level);
        Ok(())
    }

    fn get_level(&mut self, raw: RawGpio) -> Result<Level, GpioError> {
        let pin = *self
            .open
            .get(&raw.0)
            .ok_or(GpioError::Released { pin: raw.0 })?;
        if self.fail_read.contains(&pin) {
            return Err(GpioError::ReadFailed { pin, rc: -5 });
        }
        if let Some(&level) = self.overrides.get(&pin) {
            return Ok(level);
        }
        let level = self
            .partner
            .get(&pin)
            .and_then(|p| self.history.get(p))
            .and_then(|h| h.last())
            .copied()
            .unwrap_or(Level::High);
        Ok(level)
    }

    fn close(&mut self, raw: RawGpio) -> Result<(), GpioError> {
        self.open.remove(&raw.0);
        self.gpio_closes += 1;
        Ok(())
    }
}

impl SerialPort for MockBench {
    fn open(&mut self, channel: u8, _baud: u32) -> Result<RawSerial, SerialError> {
        self.uart_open.insert(i32::from(channel));
        self.uart_rx.insert(i32::from(channel), Vec::new());
        Ok(RawSerial(i32::from(channel)))
    }

    fn write(&mut self, raw: RawSerial, data: &[u8]) -> Result<usize, SerialError> {
        if !self.uart_mute {
            self.uart_rx.entry(raw.0).or_default().extend_from_slice(data);
        }
        Ok(data.len())
    }

    fn read(&mut self, raw: RawSerial, buf: &mut [u8]) -> Result<usize, SerialError> {
        let rx = self.uart_rx.entry(raw.0).or_default();
        let n = rx.len().min(buf.len());
        buf[..n].copy_from_slice(&rx[..n]);
        rx.drain(..n);
        Ok(n)
    }

    fn close(&mut self, raw: RawSerial) -> Result<(), SerialError> {
        self.uart_open.remove(&raw.0);
        self.uart_closes += 1;
        Ok(())
    }
}

// ── MockWifi ──────────────────────────────────────────────────

pub struct MockWifi {
    pub associate_after: u32,
    polls: u32,
    pub neighbourhood: Vec<(&'static str, i32)>,
    pub full_runs: u32,
    pub forgets: u32,
}

impl MockWifi {
    pub fn healthy() -> Self {
        Self {
            associate_after: 1,
            polls: 0,
            neighbourhood: vec![("FACTORY-AP", -60), ("warehouse-guest", -83)],
            full_runs: 0,
            forgets: 0,
        }
    }
}

impl WifiPort for MockWifi {
    fn store_network(&mut self, _ssid: &str, _key: &str) -> Result<StoreOutcome, WifiError> {
        self.full_runs += 1;
        self.polls = 0;
        Ok(StoreOutcome::Stored)
    }

    fn current_network(&mut self) -> Option<ConnectedNetwork> {
        self.polls += 1;
        if self.polls > self.associate_after {
            let mut network = ConnectedNetwork::default();
            let _ = network.ssid.push_str("FACTORY-AP");
            network.frequency_mhz = 2437;
            Some(network)
        } else {
            None
        }
    }

    fn scan(&mut self) -> Result<usize, WifiError> {
        Ok(self.neighbourhood.len())
    }

    fn scanned_networks(&mut self) -> Result<ScanList, WifiError> {
        let mut list = ScanList::new();
        for &(ssid, rssi) in &self.neighbourhood {
            let mut entry = ScannedNetwork {
                ssid: heapless::String::new(),
                rssi_dbm: rssi,
                frequency_mhz: 2437,
            };
            let _ = entry.ssid.push_str(ssid);
            let _ = list.push(entry);
        }
        Ok(list)
    }

    fn forget_all(&mut self) -> Result<(), WifiError> {
        self.forgets += 1;
        Ok(())
    }
}

// ── InstantClock ──────────────────────────────────────────────

/// Clock whose sleeps are instant but recorded.
pub struct InstantClock {
    pub sleeps: Vec<u32>,
}

impl InstantClock {
    pub fn new() -> Self {
        Self { sleeps: Vec::new() }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimePort for InstantClock {
    fn sleep_ms(&mut self, ms: u32) {
        self.sleeps.push(ms);
    }

    fn uptime_ms(&self) -> u64 {
        self.sleeps.iter().map(|&ms| u64::from(ms)).sum()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<HarnessEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &HarnessEvent) {
        self.events.push(event.clone());
    }
}
