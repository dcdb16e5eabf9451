//! Tri-colour status indicator.
//!
//! Three discrete LEDs behind one lens (common anode — drive LOW to
//! light).  The indicator is the only signal the operator watches:
//! the Red→Green→Blue→Off run sequence while checks execute, then a
//! settled Green (pass) or Red (fail) until the next retest.
//!
//! Setting a colour is a three-pin write; the orchestrator never
//! exposes a half-written colour because nothing else runs between the
//! writes.

use crate::app::ports::{GpioPort, Level, PinId, TimePort};
use crate::error::GpioError;
use crate::guard::PinLease;

/// Lit level for the indicator LEDs.
const LED_ON: Level = Level::Low;
const LED_OFF: Level = Level::High;

/// Displayable indicator colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorColor {
    Off,
    Red,
    Green,
    Blue,
}

impl IndicatorColor {
    /// Per-channel (red, green, blue) pin levels for this colour.
    const fn channel_levels(self) -> (Level, Level, Level) {
        match self {
            Self::Off => (LED_OFF, LED_OFF, LED_OFF),
            Self::Red => (LED_ON, LED_OFF, LED_OFF),
            Self::Green => (LED_OFF, LED_ON, LED_OFF),
            Self::Blue => (LED_OFF, LED_OFF, LED_ON),
        }
    }
}

/// The colour walk shown while a run is in progress.  "White" on the
/// schematic legend, rendered as a sequential walk of the primaries.
pub const RUN_SEQUENCE: [IndicatorColor; 4] = [
    IndicatorColor::Red,
    IndicatorColor::Green,
    IndicatorColor::Blue,
    IndicatorColor::Off,
];

pub struct StatusIndicator {
    red: PinLease,
    green: PinLease,
    blue: PinLease,
}

impl StatusIndicator {
    /// Claim the three indicator pins, starting dark.
    pub fn open<G: GpioPort>(
        gpio: &mut G,
        red_pin: PinId,
        green_pin: PinId,
        blue_pin: PinId,
    ) -> Result<Self, GpioError> {
        let mut red = PinLease::output(gpio, red_pin, LED_OFF)?;
        let mut green = match PinLease::output(gpio, green_pin, LED_OFF) {
            Ok(lease) => lease,
            Err(e) => {
                red.release(gpio);
                return Err(e);
            }
        };
        let blue = match PinLease::output(gpio, blue_pin, LED_OFF) {
            Ok(lease) => lease,
            Err(e) => {
                red.release(gpio);
                green.release(gpio);
                return Err(e);
            }
        };
        Ok(Self { red, green, blue })
    }

    /// Show `colour` (three-pin write).
    pub fn set<G: GpioPort>(&self, gpio: &mut G, colour: IndicatorColor) -> Result<(), GpioError> {
        let (r, g, b) = colour.channel_levels();
        self.red.set(gpio, r)?;
        self.green.set(gpio, g)?;
        self.blue.set(gpio, b)?;
        Ok(())
    }

    /// Walk `colours` with a fixed dwell between steps.
    pub fn sequence<G, T>(
        &self,
        gpio: &mut G,
        clock: &mut T,
        colours: &[IndicatorColor],
        step_ms: u32,
    ) -> Result<(), GpioError>
    where
        G: GpioPort,
        T: TimePort,
    {
        for &colour in colours {
            self.set(gpio, colour)?;
            clock.sleep_ms(step_ms);
        }
        Ok(())
    }

    /// Dark the indicator and release all three pins.
    pub fn close<G: GpioPort>(&mut self, gpio: &mut G) {
        // Best effort — the process is leaving either way.
        let _ = self.set(gpio, IndicatorColor::Off);
        self.red.release(gpio);
        self.green.release(gpio);
        self.blue.release(gpio);
    }
}
