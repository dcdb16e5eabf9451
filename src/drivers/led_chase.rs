//! Auxiliary indicator bank — the visual chase.
//!
//! The carrier edge LEDs have no sense line, so the harness cannot
//! verify them electrically.  Instead it chases the bank on every run:
//! each LED lights for one step delay and is forced back off before the
//! next one lights, so the operator can spot a dead position at a
//! glance.  The drive level alternates between runs, giving the
//! operator an on-pattern and an off-pattern to compare.
//!
//! The bank is claimed once at init and held until shutdown, when every
//! pin is restored to the inactive level and released.

use log::info;

use crate::app::ports::{GpioPort, Level, PinId, TimePort};
use crate::config::MAX_AUX_LEDS;
use crate::error::GpioError;
use crate::guard::PinLease;

/// Inactive (dark) level for the bank — LEDs are active-low.
const INACTIVE: Level = Level::High;

pub struct AuxLedBank {
    leases: heapless::Vec<PinLease, MAX_AUX_LEDS>,
}

impl AuxLedBank {
    /// Claim every pin in `pins`, in order, all dark.  On a mid-list
    /// open failure the already-claimed pins are released before the
    /// error returns.
    pub fn open<G: GpioPort>(gpio: &mut G, pins: &[PinId]) -> Result<Self, GpioError> {
        let mut leases: heapless::Vec<PinLease, MAX_AUX_LEDS> = heapless::Vec::new();

        for &pin in pins {
            match PinLease::output(gpio, pin, INACTIVE) {
                Ok(lease) => {
                    // Capacity matches the config bound; a longer list is a
                    // wiring-table bug caught here rather than silently dropped.
                    if leases.push(lease).is_err() {
                        release_all(gpio, &mut leases);
                        return Err(GpioError::OpenFailed { pin, rc: -1 });
                    }
                }
                Err(e) => {
                    release_all(gpio, &mut leases);
                    return Err(e);
                }
            }
        }

        info!("led-chase: claimed {} auxiliary LED(s)", leases.len());
        Ok(Self { leases })
    }

    pub fn len(&self) -> usize {
        self.leases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }

    /// Chase the bank: each pin goes to `level`, dwells, and is forced
    /// back to inactive before the next pin moves.
    pub fn chase<G, T>(&self, gpio: &mut G, clock: &mut T, level: Level, step_ms: u32) -> Result<(), GpioError>
    where
        G: GpioPort,
        T: TimePort,
    {
        for lease in &self.leases {
            lease.set(gpio, level)?;
            clock.sleep_ms(step_ms);
            lease.set(gpio, INACTIVE)?;
        }
        Ok(())
    }

    /// Force the whole bank to the inactive level and release it.
    pub fn close<G: GpioPort>(&mut self, gpio: &mut G) {
        for lease in &self.leases {
            // Best effort; the pins are being released right after.
            let _ = lease.set(gpio, INACTIVE);
        }
        release_all(gpio, &mut self.leases);
    }
}

fn release_all<G: GpioPort>(gpio: &mut G, leases: &mut heapless::Vec<PinLease, MAX_AUX_LEDS>) {
    for lease in leases.iter_mut() {
        lease.release(gpio);
    }
    leases.clear();
}
