//! Test plan configuration.
//!
//! Everything the suite exercises is fixed at configuration time: the
//! loopback pairs, the drive-level pattern, the serial channels, the
//! wireless credentials and thresholds, and the pacing delays.  The
//! default plan mirrors the fixture wiring declared in [`crate::pins`].

use serde::{Deserialize, Serialize};

use crate::app::ports::{Level, PinId};
use crate::pins;

/// Most loopback pairs a carrier revision has ever needed.
pub const MAX_PAIRS: usize = 24;
/// Drive-level pattern length bound.
pub const MAX_LEVELS: usize = 8;
/// Serial channels under test.
pub const MAX_CHANNELS: usize = 3;
/// Retest buttons on the fixture.
pub const MAX_BUTTONS: usize = 2;
/// Auxiliary indicator bank size bound.
pub const MAX_AUX_LEDS: usize = 32;

/// One jumpered GPIO pair, listed as (drive, sense) for the forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioPair {
    pub drive: PinId,
    pub sense: PinId,
}

impl GpioPair {
    pub const fn new(drive: PinId, sense: PinId) -> Self {
        Self { drive, sense }
    }

    /// The same jumper with the roles swapped (reverse pass).
    pub const fn swapped(self) -> Self {
        Self {
            drive: self.sense,
            sense: self.drive,
        }
    }
}

/// Full acceptance-test plan for one fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPlan {
    // --- GPIO loopback ---
    /// Jumpered pairs to exercise.  Empty list: the GPIO check trivially passes.
    pub gpio_pairs: heapless::Vec<GpioPair, MAX_PAIRS>,
    /// Levels driven through each pair, in order.  Must not be empty.
    pub drive_levels: heapless::Vec<Level, MAX_LEVELS>,
    /// Re-run each pair with drive and sense swapped.
    pub test_both_directions: bool,

    // --- Serial loopback ---
    /// UART channels with TX jumpered to RX.  Empty list: trivially passes.
    pub serial_channels: heapless::Vec<u8, MAX_CHANNELS>,
    pub serial_baud: u32,
    /// Settle time between the write and the single read-back.
    pub serial_settle_ms: u32,

    // --- Connectivity ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_key: heapless::String<64>,
    /// Weakest acceptable RSSI for the configured SSID, in dBm.
    pub min_signal_dbm: f32,
    /// Association poll bound (one poll per second).
    pub wifi_connect_attempts: u32,
    /// Freeze the connectivity verdict after the first run.  Saves test
    /// time on retest; masks transient radio issues — documented trade-off.
    pub run_wifi_once: bool,

    // --- Operator I/O ---
    /// Retest buttons (active-low).  One or two per fixture.
    pub retest_buttons: heapless::Vec<PinId, MAX_BUTTONS>,
    /// Auxiliary indicator bank, chased in order on every run.
    pub aux_leds: heapless::Vec<PinId, MAX_AUX_LEDS>,

    // --- Pacing ---
    /// Delay between indicator colour steps and aux chase steps.
    pub indicator_step_ms: u32,
    /// Hold before the first GPIO drive so the operator sees the run colours.
    pub pre_check_hold_ms: u32,
    /// Retest-button sampling period.
    pub input_poll_ms: u32,
}

impl Default for TestPlan {
    fn default() -> Self {
        let mut gpio_pairs = heapless::Vec::new();
        for &(drive, sense) in pins::LOOPBACK_PAIRS {
            let _ = gpio_pairs.push(GpioPair::new(drive, sense));
        }

        let mut drive_levels = heapless::Vec::new();
        let _ = drive_levels.extend_from_slice(&[Level::Low, Level::High, Level::Low, Level::High]);

        let mut serial_channels = heapless::Vec::new();
        let _ = serial_channels.push(pins::LOOPBACK_UART);

        let mut retest_buttons = heapless::Vec::new();
        let _ = retest_buttons.push(pins::RETEST_BUTTON_A_GPIO);
        let _ = retest_buttons.push(pins::RETEST_BUTTON_B_GPIO);

        let mut aux_leds = heapless::Vec::new();
        let _ = aux_leds.extend_from_slice(pins::AUX_LED_GPIOS);

        Self {
            gpio_pairs,
            drive_levels,
            test_both_directions: true,

            serial_channels,
            serial_baud: 9600,
            serial_settle_ms: 22,

            wifi_ssid: heapless::String::try_from("FACTORY-AP").unwrap_or_default(),
            wifi_key: heapless::String::try_from("station-test-key").unwrap_or_default(),
            min_signal_dbm: -75.0,
            wifi_connect_attempts: 45,
            run_wifi_once: true,

            retest_buttons,
            aux_leds,

            indicator_step_ms: 400,
            pre_check_hold_ms: 1000,
            input_poll_ms: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_is_sane() {
        let p = TestPlan::default();
        assert!(!p.drive_levels.is_empty(), "level pattern must not be empty");
        assert!(p.serial_baud > 0);
        assert!(p.wifi_connect_attempts > 0);
        assert!(p.min_signal_dbm < 0.0, "RSSI threshold is dBm, must be negative");
        assert!(!p.retest_buttons.is_empty());
        assert!(p.input_poll_ms > 0);
    }

    #[test]
    fn pairs_have_distinct_pins() {
        let p = TestPlan::default();
        for pair in &p.gpio_pairs {
            assert_ne!(pair.drive, pair.sense, "a pin cannot loop back to itself");
        }
    }

    #[test]
    fn swapped_pair_reverses_roles() {
        let pair = GpioPair::new(4, 5);
        let rev = pair.swapped();
        assert_eq!(rev.drive, 5);
        assert_eq!(rev.sense, 4);
    }

    #[test]
    fn serde_roundtrip() {
        let p = TestPlan::default();
        let json = serde_json::to_string(&p).unwrap();
        let p2: TestPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(p.gpio_pairs, p2.gpio_pairs);
        assert_eq!(p.drive_levels, p2.drive_levels);
        assert_eq!(p.serial_baud, p2.serial_baud);
        assert!((p.min_signal_dbm - p2.min_signal_dbm).abs() < 0.001);
    }
}
