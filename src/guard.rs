//! Peripheral resource guard — descriptor lifetime in one place.
//!
//! Every GPIO or UART descriptor the harness opens lives inside a lease.
//! A lease releases exactly once: `release` is idempotent (guarded by
//! the unopened sentinel) and close failures are logged, never
//! propagated — by the time a descriptor is being closed the check has
//! already determined its verdict, so cleanup is best-effort.
//!
//! Acquire failures, by contrast, are hard errors: if a required pin or
//! channel cannot be opened, the rig can no longer guarantee a safe
//! physical test state and the orchestrator shuts the process down.
//!
//! A lease never hands out its raw handle.  Reads and writes go through
//! the lease itself, so a released descriptor cannot be touched — the
//! guarded call fails instead of the driver seeing a dead handle.

use log::{error, info, warn};

use crate::app::ports::{GpioPort, Level, PinId, RawGpio, RawSerial, SerialPort};
use crate::error::{GpioError, SerialError};

// ───────────────────────────────────────────────────────────────
// GPIO lease
// ───────────────────────────────────────────────────────────────

/// A claimed GPIO descriptor.  `handle == None` means unopened or
/// already released.
#[derive(Debug)]
pub struct PinLease {
    pin: PinId,
    handle: Option<RawGpio>,
}

impl PinLease {
    /// Claim `pin` as a push-pull output driven to `initial`.
    pub fn output<G: GpioPort>(
        gpio: &mut G,
        pin: PinId,
        initial: Level,
    ) -> Result<Self, GpioError> {
        match gpio.open_output(pin, initial) {
            Ok(handle) => Ok(Self {
                pin,
                handle: Some(handle),
            }),
            Err(e) => {
                error!("guard: could not open GPIO{pin} as output — {e}");
                Err(e)
            }
        }
    }

    /// Claim `pin` as an input.
    pub fn input<G: GpioPort>(gpio: &mut G, pin: PinId) -> Result<Self, GpioError> {
        match gpio.open_input(pin) {
            Ok(handle) => Ok(Self {
                pin,
                handle: Some(handle),
            }),
            Err(e) => {
                error!("guard: could not open GPIO{pin} as input — {e}");
                Err(e)
            }
        }
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Drive the leased output to `level`.
    pub fn set<G: GpioPort>(&self, gpio: &mut G, level: Level) -> Result<(), GpioError> {
        let raw = self.handle.ok_or(GpioError::Released { pin: self.pin })?;
        gpio.set_level(raw, level)
    }

    /// Sample the leased input.
    pub fn read<G: GpioPort>(&self, gpio: &mut G) -> Result<Level, GpioError> {
        let raw = self.handle.ok_or(GpioError::Released { pin: self.pin })?;
        gpio.get_level(raw)
    }

    /// Release the descriptor.  Safe to call any number of times; a
    /// close failure is logged and swallowed.
    pub fn release<G: GpioPort>(&mut self, gpio: &mut G) {
        if let Some(raw) = self.handle.take() {
            if let Err(e) = gpio.close(raw) {
                warn!("guard: closing GPIO{} failed — {e}", self.pin);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Serial lease
// ───────────────────────────────────────────────────────────────

/// A claimed UART descriptor, same discipline as [`PinLease`].
#[derive(Debug)]
pub struct SerialLease {
    channel: u8,
    handle: Option<RawSerial>,
}

impl SerialLease {
    pub fn open<S: SerialPort>(serial: &mut S, channel: u8, baud: u32) -> Result<Self, SerialError> {
        match serial.open(channel, baud) {
            Ok(handle) => {
                info!("guard: UART{channel} open at {baud} baud");
                Ok(Self {
                    channel,
                    handle: Some(handle),
                })
            }
            Err(e) => {
                error!("guard: could not open UART{channel} — {e}");
                Err(e)
            }
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn write<S: SerialPort>(&self, serial: &mut S, data: &[u8]) -> Result<usize, SerialError> {
        let raw = self.handle.ok_or(SerialError::Released {
            channel: self.channel,
        })?;
        serial.write(raw, data)
    }

    pub fn read<S: SerialPort>(&self, serial: &mut S, buf: &mut [u8]) -> Result<usize, SerialError> {
        let raw = self.handle.ok_or(SerialError::Released {
            channel: self.channel,
        })?;
        serial.read(raw, buf)
    }

    /// Release the descriptor.  Idempotent; close failures logged only.
    pub fn release<S: SerialPort>(&mut self, serial: &mut S) {
        if let Some(raw) = self.handle.take() {
            if let Err(e) = serial.close(raw) {
                warn!("guard: closing UART{} failed — {e}", self.channel);
            }
        }
    }
}
