//! GPIO / peripheral pin assignments for the BoardCheck fixture carrier.
//!
//! Single source of truth — the default [`TestPlan`](crate::config::TestPlan)
//! and every driver reference this module rather than hard-coding pin
//! numbers.  Change a pin here and it propagates everywhere.
//!
//! The board under test sits in a bed-of-nails carrier that jumpers each
//! loopback pair together and ties UART1 TX back to RX.

use crate::app::ports::PinId;

// ---------------------------------------------------------------------------
// Status indicator (discrete RGB, common anode — drive LOW to light)
// ---------------------------------------------------------------------------

pub const STATUS_RED_GPIO: PinId = 11;
pub const STATUS_GREEN_GPIO: PinId = 12;
pub const STATUS_BLUE_GPIO: PinId = 13;

// ---------------------------------------------------------------------------
// Operator retest buttons (active-low momentary, external pull-up)
// ---------------------------------------------------------------------------

/// Primary retest button on the fixture lid.
pub const RETEST_BUTTON_A_GPIO: PinId = 16;
/// Secondary retest button on the bench panel.
pub const RETEST_BUTTON_B_GPIO: PinId = 15;

// ---------------------------------------------------------------------------
// GPIO loopback headers
// ---------------------------------------------------------------------------
//
// Each pair below is bridged by the carrier.  Listed as (drive, sense);
// the suite swaps roles for the reverse pass.

pub const LOOPBACK_PAIRS: &[(PinId, PinId)] = &[(4, 5), (6, 7), (8, 9), (10, 21)];

// ---------------------------------------------------------------------------
// Serial loopback
// ---------------------------------------------------------------------------

/// UART port wired TX→RX on the carrier.
pub const LOOPBACK_UART: u8 = 1;
pub const UART_TX_GPIO: PinId = 17;
pub const UART_RX_GPIO: PinId = 18;

// ---------------------------------------------------------------------------
// Auxiliary indicator bank (carrier edge LEDs, active-low)
// ---------------------------------------------------------------------------
//
// Chased in listed order so a missing LED is visually obvious.

pub const AUX_LED_GPIOS: &[PinId] = &[35, 36, 37, 38, 39, 40, 41, 42];
