//! Outbound harness events.
//!
//! The [`Harness`](super::service::Harness) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — today a serial log; a factory MES
//! bridge would implement the same trait.

use crate::checks::{CheckId, Verdict};

/// Structured events emitted by the harness core.
#[derive(Debug, Clone)]
pub enum HarnessEvent {
    /// A test cycle has started (carries the 1-based cycle number).
    SuiteStarted { cycle: u32 },

    /// One check finished with its individual verdict.
    CheckCompleted { check: CheckId, verdict: Verdict },

    /// The whole cycle finished; the indicator now shows the aggregate.
    SuiteCompleted(SuiteReport),

    /// The harness is releasing resources and exiting.
    ShuttingDown,
}

/// Aggregate result of one full test cycle.
#[derive(Debug, Clone, Copy)]
pub struct SuiteReport {
    pub cycle: u32,
    pub gpio_loopback: Verdict,
    pub serial_loopback: Verdict,
    pub connectivity: Verdict,
    /// AND of every check above.
    pub aggregate: Verdict,
}
