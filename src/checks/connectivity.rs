//! Wireless connectivity check.
//!
//! Stores the factory AP credentials on the board, waits (bounded) for
//! association, sweeps the neighbourhood, and requires the configured
//! SSID to show up above the signal threshold.  Credentials are wiped
//! afterwards so the board never ships knowing the factory network.
//!
//! With `run_wifi_once` set, the verdict is computed on the first run
//! and replayed on retests.  That saves the better part of a minute per
//! button press, at the cost of masking a radio that only fails warm —
//! a deliberate trade-off the operator can disable in the plan.
//!
//! Wireless API failures never terminate the harness: the radio is on
//! the board under test, so a broken radio is a failing board, not a
//! broken rig.

use log::{error, info, warn};

use crate::app::ports::{StoreOutcome, TimePort, WifiPort};
use crate::config::TestPlan;

use super::Verdict;

/// Seconds between association polls.
const POLL_INTERVAL_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    NotRun,
    CompletedOnce(Verdict),
}

/// Connectivity check with optional run-once verdict caching.
#[derive(Debug)]
pub struct ConnectivityCheck {
    state: RunState,
}

impl ConnectivityCheck {
    pub fn new() -> Self {
        Self {
            state: RunState::NotRun,
        }
    }

    /// Whether a full run has completed at least once.
    pub fn has_run(&self) -> bool {
        matches!(self.state, RunState::CompletedOnce(_))
    }

    /// Execute the check (or replay the cached verdict).
    pub fn run<W, T>(&mut self, wifi: &mut W, clock: &mut T, plan: &TestPlan) -> Verdict
    where
        W: WifiPort,
        T: TimePort,
    {
        if plan.run_wifi_once {
            if let RunState::CompletedOnce(cached) = self.state {
                info!(
                    "connectivity: not run again — first pass {}",
                    if cached.passed() { "passed" } else { "failed" }
                );
                return cached;
            }
        }

        let verdict = run_full(wifi, clock, plan);

        // Cache after the run completes, never before — the very first
        // call must always reflect a real measurement.
        if plan.run_wifi_once {
            self.state = RunState::CompletedOnce(verdict);
        }
        verdict
    }
}

impl Default for ConnectivityCheck {
    fn default() -> Self {
        Self::new()
    }
}

fn run_full<W, T>(wifi: &mut W, clock: &mut T, plan: &TestPlan) -> Verdict
where
    W: WifiPort,
    T: TimePort,
{
    let mut verdict = Verdict::Pass;
    let ssid = plan.wifi_ssid.as_str();

    match wifi.store_network(ssid, plan.wifi_key.as_str()) {
        Ok(StoreOutcome::Stored) => {
            info!("connectivity: stored network \"{ssid}\"");
        }
        Ok(StoreOutcome::AlreadyStored) => {
            info!("connectivity: network \"{ssid}\" already stored on the device");
        }
        Err(e) => {
            warn!("connectivity: FAIL — could not store network \"{ssid}\": {e}");
            verdict = Verdict::Fail;
        }
    }

    // Bounded association wait, one poll per second.
    let mut associated = None;
    for attempt in 1..=plan.wifi_connect_attempts {
        clock.sleep_ms(POLL_INTERVAL_MS);
        info!("connectivity: connecting to network ({attempt}/{})", plan.wifi_connect_attempts);
        if let Some(network) = wifi.current_network() {
            associated = Some(network);
            break;
        }
    }

    match &associated {
        Some(network) => {
            let b = network.bssid;
            info!(
                "connectivity: connected — SSID \"{}\", BSSID {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}, {} MHz",
                network.ssid, b[0], b[1], b[2], b[3], b[4], b[5], network.frequency_mhz
            );
        }
        None => {
            warn!(
                "connectivity: FAIL — no association after {} attempt(s)",
                plan.wifi_connect_attempts
            );
            verdict = Verdict::Fail;
        }
    }

    // Sweep regardless of association: an empty neighbourhood means the
    // receive path is dead even if the join state machine wedged.
    verdict = verdict.and(scan_and_rate(wifi, ssid, plan.min_signal_dbm));

    // Cleanup is best-effort; the verdict is already decided.
    match wifi.forget_all() {
        Ok(()) => info!("connectivity: removed all stored networks"),
        Err(e) => error!("connectivity: could not remove stored networks — {e}"),
    }

    verdict
}

/// Scan, log the neighbourhood, and rate the configured SSID's signal.
fn scan_and_rate<W: WifiPort>(wifi: &mut W, ssid: &str, min_signal_dbm: f32) -> Verdict {
    let count = match wifi.scan() {
        Ok(n) => n,
        Err(e) => {
            warn!("connectivity: FAIL — scan failed: {e}");
            return Verdict::Fail;
        }
    };

    if count == 0 {
        warn!("connectivity: FAIL — scan found no networks");
        return Verdict::Fail;
    }

    let networks = match wifi.scanned_networks() {
        Ok(list) => list,
        Err(e) => {
            warn!("connectivity: FAIL — could not fetch scan results: {e}");
            return Verdict::Fail;
        }
    };

    info!("connectivity: scan found {count} network(s):");
    let mut signal_dbm: Option<f32> = None;
    for (i, network) in networks.iter().enumerate() {
        info!(
            "connectivity: {:3}) SSID \"{}\", signal {} dBm, {} MHz",
            i, network.ssid, network.rssi_dbm, network.frequency_mhz
        );
        if signal_dbm.is_none() && network.ssid.as_str() == ssid {
            signal_dbm = Some(network.rssi_dbm as f32);
        }
    }

    // "Not found" fails outright — a missing SSID must not slip through
    // the threshold comparison.
    match signal_dbm {
        None => {
            warn!("connectivity: FAIL — configured SSID \"{ssid}\" not present in scan");
            Verdict::Fail
        }
        Some(level) if level < min_signal_dbm => {
            warn!(
                "connectivity: FAIL — signal {level:.0} dBm below minimum {min_signal_dbm:.0} dBm"
            );
            Verdict::Fail
        }
        Some(level) => {
            info!("connectivity: signal {level:.0} dBm meets minimum {min_signal_dbm:.0} dBm");
            Verdict::Pass
        }
    }
}
