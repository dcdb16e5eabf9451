//! Unified error types for the BoardCheck firmware.
//!
//! Only hardware-unavailable conditions surface as `Err` — an open,
//! read, or write that fails at the driver level means the rig itself
//! can no longer be trusted, so the orchestrator shuts down.  A board
//! that merely fails a check is a [`Verdict::Fail`](crate::checks::Verdict),
//! never an error.  All variants are `Copy` so they pass through the
//! dispatch loop without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every unrecoverable condition in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A GPIO could not be opened, driven, or read.
    Gpio(GpioError),
    /// A serial channel could not be opened, written, or read.
    Serial(SerialError),
    /// The wireless configuration API failed outright.
    Wifi(WifiError),
    /// Peripheral or harness initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Serial(e) => write!(f, "serial: {e}"),
            Self::Wifi(e) => write!(f, "wifi: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// The driver refused to open the pin (rc carries the driver code).
    OpenFailed { pin: i32, rc: i32 },
    /// A level write on an open output failed.
    SetFailed { pin: i32, rc: i32 },
    /// A level read on an open input failed.
    ReadFailed { pin: i32, rc: i32 },
    /// Releasing the descriptor failed (logged, never escalated).
    CloseFailed { pin: i32, rc: i32 },
    /// The lease was already released — the raw handle is gone.
    Released { pin: i32 },
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed { pin, rc } => write!(f, "GPIO{pin} open failed (rc={rc})"),
            Self::SetFailed { pin, rc } => write!(f, "GPIO{pin} set failed (rc={rc})"),
            Self::ReadFailed { pin, rc } => write!(f, "GPIO{pin} read failed (rc={rc})"),
            Self::CloseFailed { pin, rc } => write!(f, "GPIO{pin} close failed (rc={rc})"),
            Self::Released { pin } => write!(f, "GPIO{pin} used after release"),
        }
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

// ---------------------------------------------------------------------------
// Serial errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    OpenFailed { channel: u8, rc: i32 },
    WriteFailed { channel: u8, rc: i32 },
    ReadFailed { channel: u8, rc: i32 },
    /// Releasing the channel failed (logged, never escalated).
    CloseFailed { channel: u8, rc: i32 },
    /// The lease was already released.
    Released { channel: u8 },
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed { channel, rc } => write!(f, "UART{channel} open failed (rc={rc})"),
            Self::WriteFailed { channel, rc } => write!(f, "UART{channel} write failed (rc={rc})"),
            Self::ReadFailed { channel, rc } => write!(f, "UART{channel} read failed (rc={rc})"),
            Self::CloseFailed { channel, rc } => write!(f, "UART{channel} close failed (rc={rc})"),
            Self::Released { channel } => write!(f, "UART{channel} used after release"),
        }
    }
}

impl From<SerialError> for Error {
    fn from(e: SerialError) -> Self {
        Self::Serial(e)
    }
}

// ---------------------------------------------------------------------------
// Wireless errors
// ---------------------------------------------------------------------------

/// Wireless API failures.  These normally downgrade to a check `Fail`
/// rather than escalating — the radio belongs to the board under test,
/// not the rig — so this type mostly travels inside check-local results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    StoreFailed { rc: i32 },
    ScanFailed { rc: i32 },
    ForgetFailed { rc: i32 },
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreFailed { rc } => write!(f, "store network failed (rc={rc})"),
            Self::ScanFailed { rc } => write!(f, "scan failed (rc={rc})"),
            Self::ForgetFailed { rc } => write!(f, "forget networks failed (rc={rc})"),
        }
    }
}

impl From<WifiError> for Error {
    fn from(e: WifiError) -> Self {
        Self::Wifi(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
