//! Bench hardware adapter — bridges the fixture's pins and UARTs to the
//! domain port traits.
//!
//! Implements [`GpioPort`] and [`SerialPort`].  This is the only module
//! in the system that touches actual registers.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: raw ESP-IDF sys calls (`gpio_config`,
//!   `gpio_set_level`, UART driver).  A descriptor is the pin/port
//!   number itself; open configures the silicon, close resets it.
//! - **all other targets**: an in-memory bench simulation.  The carrier
//!   jumpers are modelled as a pin-partner map seeded from the test
//!   plan, so inputs read back whatever their bridged partner drives
//!   and each UART echoes its own TX — a workstation run goes green
//!   end to end.

use crate::app::ports::{GpioPort, Level, PinId, RawGpio, RawSerial, SerialPort};
use crate::error::{GpioError, SerialError};

#[cfg(not(target_os = "espidf"))]
use crate::config::TestPlan;

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct BenchAdapter {
    #[cfg(not(target_os = "espidf"))]
    sim: sim::SimBench,
}

impl BenchAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {}
    }

    /// Host constructor: the simulated carrier is wired per `plan`.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(plan: &TestPlan) -> Self {
        Self {
            sim: sim::SimBench::from_plan(plan),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// GpioPort — device
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod idf {
    use super::*;
    use esp_idf_svc::sys::*;

    pub fn configure(pin: PinId, output: bool) -> Result<(), i32> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: if output {
                gpio_mode_t_GPIO_MODE_INPUT_OUTPUT
            } else {
                gpio_mode_t_GPIO_MODE_INPUT
            },
            pull_up_en: if output {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            },
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: gpio_config validates the mask; called from the single
        // main-task context.
        let ret = unsafe { gpio_config(&cfg) };
        if ret == ESP_OK { Ok(()) } else { Err(ret) }
    }

    pub fn write(pin: PinId, level: Level) -> Result<(), i32> {
        // SAFETY: register write on a configured pin, main task only.
        let ret = unsafe { gpio_set_level(pin, u32::from(level == Level::High)) };
        if ret == ESP_OK { Ok(()) } else { Err(ret) }
    }

    pub fn read(pin: PinId) -> Level {
        // SAFETY: gpio_get_level is a read-only register access.
        if unsafe { gpio_get_level(pin) } != 0 {
            Level::High
        } else {
            Level::Low
        }
    }

    pub fn reset(pin: PinId) -> Result<(), i32> {
        // SAFETY: returns the pin to its power-on state.
        let ret = unsafe { gpio_reset_pin(pin) };
        if ret == ESP_OK { Ok(()) } else { Err(ret) }
    }
}

#[cfg(target_os = "espidf")]
impl GpioPort for BenchAdapter {
    fn open_output(&mut self, pin: PinId, initial: Level) -> Result<RawGpio, GpioError> {
        idf::configure(pin, true).map_err(|rc| GpioError::OpenFailed { pin, rc })?;
        idf::write(pin, initial).map_err(|rc| GpioError::SetFailed { pin, rc })?;
        Ok(RawGpio(pin))
    }

    fn open_input(&mut self, pin: PinId) -> Result<RawGpio, GpioError> {
        idf::configure(pin, false).map_err(|rc| GpioError::OpenFailed { pin, rc })?;
        Ok(RawGpio(pin))
    }

    fn set_level(&mut self, raw: RawGpio, level: Level) -> Result<(), GpioError> {
        idf::write(raw.0, level).map_err(|rc| GpioError::SetFailed { pin: raw.0, rc })
    }

    fn get_level(&mut self, raw: RawGpio) -> Result<Level, GpioError> {
        Ok(idf::read(raw.0))
    }

    fn close(&mut self, raw: RawGpio) -> Result<(), GpioError> {
        idf::reset(raw.0).map_err(|rc| GpioError::CloseFailed { pin: raw.0, rc })
    }
}

// ───────────────────────────────────────────────────────────────
// SerialPort — device
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl SerialPort for BenchAdapter {
    fn open(&mut self, channel: u8, baud: u32) -> Result<RawSerial, SerialError> {
        use esp_idf_svc::sys::*;

        let port = uart_port_t::from(channel);
        let cfg = uart_config_t {
            baud_rate: baud as i32,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };

        // SAFETY: driver install + config from the single main task; the
        // RX buffer must exceed the hardware FIFO, 256 is the usual floor.
        unsafe {
            let ret = uart_driver_install(port, 256, 0, 0, core::ptr::null_mut(), 0);
            if ret != ESP_OK {
                return Err(SerialError::OpenFailed { channel, rc: ret });
            }
            let ret = uart_param_config(port, &cfg);
            if ret != ESP_OK {
                uart_driver_delete(port);
                return Err(SerialError::OpenFailed { channel, rc: ret });
            }
            let ret = uart_set_pin(
                port,
                crate::pins::UART_TX_GPIO,
                crate::pins::UART_RX_GPIO,
                -1, // RTS unused — no flow control on the jumper
                -1, // CTS unused
            );
            if ret != ESP_OK {
                uart_driver_delete(port);
                return Err(SerialError::OpenFailed { channel, rc: ret });
            }
        }
        Ok(RawSerial(i32::from(channel)))
    }

    fn write(&mut self, raw: RawSerial, data: &[u8]) -> Result<usize, SerialError> {
        use esp_idf_svc::sys::*;
        // SAFETY: data pointer/len are valid for the call duration.
        let written = unsafe {
            uart_write_bytes(raw.0, data.as_ptr().cast(), data.len())
        };
        if written < 0 {
            return Err(SerialError::WriteFailed {
                channel: raw.0 as u8,
                rc: written,
            });
        }
        Ok(written as usize)
    }

    fn read(&mut self, raw: RawSerial, buf: &mut [u8]) -> Result<usize, SerialError> {
        use esp_idf_svc::sys::*;
        // SAFETY: buf pointer/len are valid; zero tick timeout makes this
        // the single non-blocking drain the check expects.
        let read = unsafe {
            uart_read_bytes(raw.0, buf.as_mut_ptr().cast(), buf.len() as u32, 0)
        };
        if read < 0 {
            return Err(SerialError::ReadFailed {
                channel: raw.0 as u8,
                rc: read,
            });
        }
        Ok(read as usize)
    }

    fn close(&mut self, raw: RawSerial) -> Result<(), SerialError> {
        use esp_idf_svc::sys::*;
        // SAFETY: deleting an installed driver from the main task.
        let ret = unsafe { uart_driver_delete(raw.0) };
        if ret == ESP_OK {
            Ok(())
        } else {
            Err(SerialError::CloseFailed {
                channel: raw.0 as u8,
                rc: ret,
            })
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation — host targets
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use super::*;
    use std::collections::HashMap;

    /// In-memory carrier: jumpered pins mirror each other, UARTs echo.
    pub struct SimBench {
        partner: HashMap<PinId, PinId>,
        driven: HashMap<PinId, Level>,
        open_pins: HashMap<i32, PinId>,
        next_handle: i32,
        uart_rx: HashMap<i32, Vec<u8>>,
    }

    impl SimBench {
        pub fn from_plan(plan: &TestPlan) -> Self {
            let mut partner = HashMap::new();
            for pair in &plan.gpio_pairs {
                partner.insert(pair.drive, pair.sense);
                partner.insert(pair.sense, pair.drive);
            }
            Self {
                partner,
                driven: HashMap::new(),
                open_pins: HashMap::new(),
                next_handle: 0,
                uart_rx: HashMap::new(),
            }
        }

        fn claim(&mut self, pin: PinId) -> RawGpio {
            self.next_handle += 1;
            self.open_pins.insert(self.next_handle, pin);
            RawGpio(self.next_handle)
        }

        fn pin_of(&self, raw: RawGpio) -> Result<PinId, GpioError> {
            self.open_pins
                .get(&raw.0)
                .copied()
                .ok_or(GpioError::Released { pin: raw.0 })
        }
    }

    impl GpioPort for SimBench {
        fn open_output(&mut self, pin: PinId, initial: Level) -> Result<RawGpio, GpioError> {
            self.driven.insert(pin, initial);
            Ok(self.claim(pin))
        }

        fn open_input(&mut self, pin: PinId) -> Result<RawGpio, GpioError> {
            Ok(self.claim(pin))
        }

        fn set_level(&mut self, raw: RawGpio, level: Level) -> Result<(), GpioError> {
            let pin = self.pin_of(raw)?;
            self.driven.insert(pin, level);
            Ok(())
        }

        fn get_level(&mut self, raw: RawGpio) -> Result<Level, GpioError> {
            let pin = self.pin_of(raw)?;
            // A jumpered input reads its partner; everything else floats
            // at the pulled-up level (buttons read released).
            let level = self
                .partner
                .get(&pin)
                .and_then(|p| self.driven.get(p))
                .copied()
                .unwrap_or(Level::High);
            Ok(level)
        }

        fn close(&mut self, raw: RawGpio) -> Result<(), GpioError> {
            self.open_pins.remove(&raw.0);
            Ok(())
        }
    }

    impl SerialPort for SimBench {
        fn open(&mut self, channel: u8, _baud: u32) -> Result<RawSerial, SerialError> {
            self.uart_rx.insert(i32::from(channel), Vec::new());
            Ok(RawSerial(i32::from(channel)))
        }

        fn write(&mut self, raw: RawSerial, data: &[u8]) -> Result<usize, SerialError> {
            // TX is jumpered straight to RX.
            self.uart_rx.entry(raw.0).or_default().extend_from_slice(data);
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
            self.uart_rx.remove(&raw.0);
            Ok(())
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl GpioPort for BenchAdapter {
    fn open_output(&mut self, pin: PinId, initial: Level) -> Result<RawGpio, GpioError> {
        self.sim.open_output(pin, initial)
    }
    fn open_input(&mut self, pin: PinId) -> Result<RawGpio, GpioError> {
        self.sim.open_input(pin)
    }
    fn set_level(&mut self, raw: RawGpio, level: Level) -> Result<(), GpioError> {
        self.sim.set_level(raw, level)
    }
    fn get_level(&mut self, raw: RawGpio) -> Result<Level, GpioError> {
        self.sim.get_level(raw)
    }
    fn close(&mut self, raw: RawGpio) -> Result<(), GpioError> {
        GpioPort::close(&mut self.sim, raw)
    }
}

#[cfg(not(target_os = "espidf"))]
impl SerialPort for BenchAdapter {
    fn open(&mut self, channel: u8, baud: u32) -> Result<RawSerial, SerialError> {
        self.sim.open(channel, baud)
    }
    fn write(&mut self, raw: RawSerial, data: &[u8]) -> Result<usize, SerialError> {
        self.sim.write(raw, data)
    }
    fn read(&mut self, raw: RawSerial, buf: &mut [u8]) -> Result<usize, SerialError> {
        self.sim.read(raw, buf)
    }
    fn close(&mut self, raw: RawSerial) -> Result<(), SerialError> {
        SerialPort::close(&mut self.sim, raw)
    }
}
