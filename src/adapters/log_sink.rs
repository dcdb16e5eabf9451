//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured harness events to the
//! logger (UART / USB-CDC in production).  A factory MES bridge would
//! implement the same trait.

use log::{info, warn};

use crate::app::events::HarnessEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`HarnessEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &HarnessEvent) {
        match event {
            HarnessEvent::SuiteStarted { cycle } => {
                info!("SUITE | cycle {cycle} started");
            }
            HarnessEvent::CheckCompleted { check, verdict } => {
                info!("CHECK | {} — {:?}", check.name(), verdict);
            }
            HarnessEvent::SuiteCompleted(report) => {
                if report.aggregate.passed() {
                    info!(
                        "SUITE | cycle {} PASSED (gpio={:?} serial={:?} wifi={:?})",
                        report.cycle,
                        report.gpio_loopback,
                        report.serial_loopback,
                        report.connectivity,
                    );
                } else {
                    warn!(
                        "SUITE | cycle {} FAILED (gpio={:?} serial={:?} wifi={:?})",
                        report.cycle,
                        report.gpio_loopback,
                        report.serial_loopback,
                        report.connectivity,
                    );
                }
            }
            HarnessEvent::ShuttingDown => {
                info!("SUITE | shutting down");
            }
        }
    }
}
