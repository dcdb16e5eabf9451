//! Port traits — the hexagonal boundary between the harness core and
//! the fixture hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Harness (domain)
//! ```
//!
//! Driven adapters (bench GPIO/UART, wireless stack, clock, event sinks)
//! implement these traits.  The [`Harness`](super::service::Harness) and
//! the checks consume them via generics, so the core never touches
//! hardware directly and every test runs against mocks on the host.
//!
//! The GPIO and serial traits deliberately mirror a descriptor-style
//! driver: open returns an opaque raw handle, every operation takes the
//! handle, close invalidates it.  Raw handles are only ever held inside
//! a [`PinLease`](crate::guard::PinLease) / [`SerialLease`](crate::guard::SerialLease)
//! so the close-exactly-once discipline lives in one place.

use crate::error::{GpioError, SerialError, WifiError};

// ───────────────────────────────────────────────────────────────
// Shared value types
// ───────────────────────────────────────────────────────────────

/// Board-level GPIO number (driver convention, matches the silicon).
pub type PinId = i32;

/// Digital line level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// Opaque GPIO descriptor returned by [`GpioPort::open_output`] /
/// [`GpioPort::open_input`].  Meaningless outside the adapter that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGpio(pub i32);

/// Opaque serial descriptor returned by [`SerialPort::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSerial(pub i32);

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: bench pins ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Descriptor-style digital I/O.
pub trait GpioPort {
    /// Configure `pin` as a push-pull output driven to `initial`.
    fn open_output(&mut self, pin: PinId, initial: Level) -> Result<RawGpio, GpioError>;

    /// Configure `pin` as an input.
    fn open_input(&mut self, pin: PinId) -> Result<RawGpio, GpioError>;

    /// Drive an open output to `level`.
    fn set_level(&mut self, raw: RawGpio, level: Level) -> Result<(), GpioError>;

    /// Sample an open input.
    fn get_level(&mut self, raw: RawGpio) -> Result<Level, GpioError>;

    /// Release the descriptor.  After this the handle is dead.
    fn close(&mut self, raw: RawGpio) -> Result<(), GpioError>;
}

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: UART ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Descriptor-style UART access.  Channels are opened 8N1 with no flow
/// control — the loopback jumper has no handshake lines.
pub trait SerialPort {
    fn open(&mut self, channel: u8, baud: u32) -> Result<RawSerial, SerialError>;

    /// Write as much of `data` as the driver accepts; returns the byte
    /// count taken.  Callers loop until the message is fully queued.
    fn write(&mut self, raw: RawSerial, data: &[u8]) -> Result<usize, SerialError>;

    /// Single bounded read of whatever has arrived; returns the byte
    /// count placed in `buf` (0 if nothing arrived).
    fn read(&mut self, raw: RawSerial, buf: &mut [u8]) -> Result<usize, SerialError>;

    fn close(&mut self, raw: RawSerial) -> Result<(), SerialError>;
}

// ───────────────────────────────────────────────────────────────
// Wireless configuration port
// ───────────────────────────────────────────────────────────────

/// Longest SSID the wireless stack reports.
pub const MAX_SSID_LEN: usize = 32;
/// Upper bound on scan results retained per sweep.
pub const MAX_SCAN_RESULTS: usize = 24;

/// Result of storing credentials that may already be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    /// The network was already configured on the device — informational.
    AlreadyStored,
}

/// The access point the station is currently associated with.
#[derive(Debug, Clone, Default)]
pub struct ConnectedNetwork {
    pub ssid: heapless::String<MAX_SSID_LEN>,
    pub bssid: [u8; 6],
    pub frequency_mhz: u32,
}

/// One entry from a scan sweep.
#[derive(Debug, Clone)]
pub struct ScannedNetwork {
    pub ssid: heapless::String<MAX_SSID_LEN>,
    /// Received signal strength in dBm (negative; closer to 0 is stronger).
    pub rssi_dbm: i32,
    pub frequency_mhz: u32,
}

/// Scan result list, bounded like the driver's record table.
pub type ScanList = heapless::Vec<ScannedNetwork, MAX_SCAN_RESULTS>;

/// Station-mode wireless configuration, shaped after the connectivity
/// check's needs: store credentials, watch for association, sweep the
/// neighbourhood, then forget everything.
pub trait WifiPort {
    /// Persist WPA2 credentials and begin associating.
    fn store_network(&mut self, ssid: &str, key: &str) -> Result<StoreOutcome, WifiError>;

    /// The currently associated AP, or `None` while unassociated.
    fn current_network(&mut self) -> Option<ConnectedNetwork>;

    /// Trigger a blocking scan; returns the number of networks found.
    fn scan(&mut self) -> Result<usize, WifiError>;

    /// Fetch the records from the most recent [`scan`](Self::scan).
    fn scanned_networks(&mut self) -> Result<ScanList, WifiError>;

    /// Remove every stored network (post-test cleanup).
    fn forget_all(&mut self) -> Result<(), WifiError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic time and fixed settling delays.
///
/// The delays are deliberate hardware-settling contracts (serial
/// round-trip, indicator step, association poll interval) — not
/// incidental waits — so they flow through a port where mocks can make
/// them instant while still asserting they were requested.
pub trait TimePort {
    fn sleep_ms(&mut self, ms: u32);

    /// Milliseconds since boot (monotonic).
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The harness emits structured [`HarnessEvent`](super::events::HarnessEvent)s
/// through this port.  Adapters decide where they go (serial log today;
/// a line printer or MES bridge would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::HarnessEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_flips() {
        assert_eq!(Level::Low.flipped(), Level::High);
        assert_eq!(Level::High.flipped(), Level::Low);
    }
}
