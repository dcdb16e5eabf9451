//! Polled retest-button edge detector.
//!
//! Active-low momentary switch with external pull-up.  The poll timer
//! samples the line every few milliseconds; a press is reported exactly
//! when the level transitions released→pressed since the previous
//! sample.  Holding the button does not re-trigger — the operator must
//! release and press again for another run.

use crate::app::ports::{GpioPort, Level};
use crate::error::GpioError;
use crate::guard::PinLease;

/// Pressed level for the fixture buttons.
const PRESSED: Level = Level::Low;

pub struct RetestButton {
    lease: PinLease,
    previous: Level,
}

impl RetestButton {
    /// Claim the button input.  Starts from the released level so a
    /// button held during boot still produces one clean edge.
    pub fn open<G: GpioPort>(gpio: &mut G, pin: i32) -> Result<Self, GpioError> {
        let lease = PinLease::input(gpio, pin)?;
        Ok(Self {
            lease,
            previous: PRESSED.flipped(),
        })
    }

    pub fn pin(&self) -> i32 {
        self.lease.pin()
    }

    /// Sample the line.  `Ok(true)` exactly on a release→press edge.
    /// A read failure means the button input itself is dead — the
    /// caller escalates it.
    pub fn sample<G: GpioPort>(&mut self, gpio: &mut G) -> Result<bool, GpioError> {
        let current = self.lease.read(gpio)?;
        let pressed = current != self.previous && current == PRESSED;
        self.previous = current;
        Ok(pressed)
    }

    /// Release the underlying input pin.
    pub fn close<G: GpioPort>(&mut self, gpio: &mut G) {
        self.lease.release(gpio);
    }
}
