//! Acceptance checks.
//!
//! Each check exercises one slice of the board under test and reports a
//! [`Verdict`].  A failing board is a `Fail`, never an `Err`: only a
//! rig-side hardware fault (unopenable pin, dead driver) escalates to
//! an error, which the orchestrator turns into termination.

pub mod connectivity;
pub mod gpio_loopback;
pub mod serial_loopback;

/// Pass/fail outcome of one check (or of the whole suite).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Logical AND: the combined verdict passes only if both do.
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Pass, Self::Pass) => Self::Pass,
            _ => Self::Fail,
        }
    }

    pub const fn passed(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

/// Identity of a check, for events and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckId {
    GpioLoopback,
    SerialLoopback,
    Connectivity,
}

impl CheckId {
    pub const fn name(self) -> &'static str {
        match self {
            Self::GpioLoopback => "gpio-loopback",
            Self::SerialLoopback => "serial-loopback",
            Self::Connectivity => "connectivity",
        }
    }
}
