//! Harness orchestrator — the hexagonal core.
//!
//! [`Harness`] owns everything with a lifetime: the claimed indicator
//! and auxiliary pins, the retest buttons, the connectivity run-once
//! state, and the retest trigger.  The dispatch loop in `main` feeds it
//! poll ticks and asks it to run; all I/O flows through port traits
//! injected at the call sites, so the whole orchestration is testable
//! against mocks.
//!
//! ```text
//!            ┌─────────────────────────────────────────┐
//!  poll tick │  Idle ──(trigger)──▶ Running            │ EventSink
//! ──────────▶│    ▲                    │               │──────────▶
//!            │    └──(suite done, LED settled)──┘      │
//!            │  any ──(termination)──▶ Terminating     │
//!            └─────────────────────────────────────────┘
//! ```
//!
//! Error policy: any `Err` leaving a method here means the rig hardware
//! is unusable; the caller stops dispatching and calls [`Harness::shutdown`],
//! which releases every claimed descriptor exactly once.

use log::{error, info, warn};

use crate::checks::{connectivity::ConnectivityCheck, gpio_loopback, serial_loopback, CheckId, Verdict};
use crate::config::{TestPlan, MAX_BUTTONS};
use crate::drivers::button::RetestButton;
use crate::drivers::led_chase::AuxLedBank;
use crate::drivers::status_led::{IndicatorColor, StatusIndicator, RUN_SEQUENCE};
use crate::error::{Error, Result};
use crate::pins;

use super::events::{HarnessEvent, SuiteReport};
use super::ports::{EventSink, GpioPort, Level, SerialPort, TimePort, WifiPort};

// ───────────────────────────────────────────────────────────────
// Phase
// ───────────────────────────────────────────────────────────────

/// Orchestrator lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a retest trigger (poll ticks keep arriving).
    Idle,
    /// The check sequence is executing; the dispatch loop is blocked.
    Running,
    /// Resources released, nothing more will run.
    Terminating,
}

// ───────────────────────────────────────────────────────────────
// Harness
// ───────────────────────────────────────────────────────────────

pub struct Harness {
    plan: TestPlan,
    phase: Phase,
    /// Edge-detected retest request; consumed by [`take_retest`](Self::take_retest).
    retest_pending: bool,
    cycle: u32,
    /// Chase drive level, alternated between runs so the operator sees
    /// both patterns.
    chase_level: Level,
    buttons: heapless::Vec<RetestButton, MAX_BUTTONS>,
    indicator: StatusIndicator,
    aux: AuxLedBank,
    connectivity: ConnectivityCheck,
}

impl Harness {
    /// Claim every long-lived peripheral and arm the initial run.
    ///
    /// The suite runs once at power-on without a button press, so the
    /// trigger starts set.  On any claim failure everything already
    /// claimed is released before the error returns.
    pub fn init<G: GpioPort>(gpio: &mut G, plan: TestPlan) -> Result<Self> {
        // The GPIO check drives this pattern verbatim; an empty one
        // would vacuously pass every pair.
        if plan.drive_levels.is_empty() {
            return Err(Error::Init("drive level pattern must not be empty"));
        }

        let mut indicator = StatusIndicator::open(
            gpio,
            pins::STATUS_RED_GPIO,
            pins::STATUS_GREEN_GPIO,
            pins::STATUS_BLUE_GPIO,
        )?;
        indicator.set(gpio, IndicatorColor::Off)?;

        let mut buttons: heapless::Vec<RetestButton, MAX_BUTTONS> = heapless::Vec::new();
        for &pin in &plan.retest_buttons {
            info!("harness: opening retest button on GPIO{pin}");
            match RetestButton::open(gpio, pin) {
                Ok(button) => {
                    if let Err(mut extra) = buttons.push(button) {
                        warn!("harness: button table full, ignoring GPIO{pin}");
                        extra.close(gpio);
                    }
                }
                Err(e) => {
                    for button in &mut buttons {
                        button.close(gpio);
                    }
                    indicator.close(gpio);
                    return Err(e.into());
                }
            }
        }

        let aux = match AuxLedBank::open(gpio, &plan.aux_leds) {
            Ok(bank) => bank,
            Err(e) => {
                for button in &mut buttons {
                    button.close(gpio);
                }
                indicator.close(gpio);
                return Err(e.into());
            }
        };

        Ok(Self {
            plan,
            phase: Phase::Idle,
            retest_pending: true,
            cycle: 0,
            chase_level: Level::Low,
            buttons,
            indicator,
            aux,
            connectivity: ConnectivityCheck::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    // ── Poll-tick handler ─────────────────────────────────────

    /// Sample every retest button; a press edge arms the trigger.
    ///
    /// This is the whole timer handler — it must never block, and it
    /// does nothing else.  A button read failure is a rig fault and
    /// propagates.
    pub fn poll_inputs<G: GpioPort>(&mut self, gpio: &mut G) -> Result<()> {
        for button in &mut self.buttons {
            if button.sample(gpio)? {
                info!("harness: retest requested (button on GPIO{})", button.pin());
                self.retest_pending = true;
            }
        }
        Ok(())
    }

    /// Consume the retest trigger.  Returns true at most once per press.
    pub fn take_retest(&mut self) -> bool {
        core::mem::take(&mut self.retest_pending)
    }

    // ── Test cycle ────────────────────────────────────────────

    /// Run one full test cycle and settle the indicator on the verdict.
    ///
    /// Checks run in a fixed order — GPIO loopback, serial loopback,
    /// connectivity — and the indicator is only touched with the final
    /// aggregate, never a partial result.
    pub fn run_suite<H, W, T, E>(
        &mut self,
        hw: &mut H,
        wifi: &mut W,
        clock: &mut T,
        sink: &mut E,
    ) -> Result<Verdict>
    where
        H: GpioPort + SerialPort,
        W: WifiPort,
        T: TimePort,
        E: EventSink,
    {
        self.phase = Phase::Running;
        self.cycle += 1;
        info!("harness: starting test cycle {}", self.cycle);
        sink.emit(&HarnessEvent::SuiteStarted { cycle: self.cycle });

        let result = self.run_checks(hw, wifi, clock, sink);
        match &result {
            Ok(report) => {
                let colour = if report.aggregate.passed() {
                    info!("harness: all checks passed");
                    IndicatorColor::Green
                } else {
                    warn!("harness: at least one check failed — see log for details");
                    IndicatorColor::Red
                };
                self.indicator.set(hw, colour)?;
                sink.emit(&HarnessEvent::SuiteCompleted(*report));
                self.phase = Phase::Idle;
                Ok(report.aggregate)
            }
            Err(e) => {
                error!("harness: cycle {} aborted — {e}", self.cycle);
                self.phase = Phase::Terminating;
                Err(*e)
            }
        }
    }

    fn run_checks<H, W, T, E>(
        &mut self,
        hw: &mut H,
        wifi: &mut W,
        clock: &mut T,
        sink: &mut E,
    ) -> Result<SuiteReport>
    where
        H: GpioPort + SerialPort,
        W: WifiPort,
        T: TimePort,
        E: EventSink,
    {
        // Run colours first so the operator knows a cycle is live.
        info!("harness: sequencing status indicator");
        self.indicator
            .sequence(hw, clock, &RUN_SEQUENCE, self.plan.indicator_step_ms)?;

        info!("harness: chasing auxiliary LED bank");
        self.aux
            .chase(hw, clock, self.chase_level, self.plan.indicator_step_ms)?;
        self.chase_level = self.chase_level.flipped();

        let gpio_verdict = gpio_loopback::run_all(hw, clock, &self.plan)?;
        sink.emit(&HarnessEvent::CheckCompleted {
            check: CheckId::GpioLoopback,
            verdict: gpio_verdict,
        });

        let serial_verdict = serial_loopback::run_all(hw, clock, &self.plan)?;
        sink.emit(&HarnessEvent::CheckCompleted {
            check: CheckId::SerialLoopback,
            verdict: serial_verdict,
        });

        let connectivity_verdict = self.connectivity.run(wifi, clock, &self.plan);
        sink.emit(&HarnessEvent::CheckCompleted {
            check: CheckId::Connectivity,
            verdict: connectivity_verdict,
        });

        Ok(SuiteReport {
            cycle: self.cycle,
            gpio_loopback: gpio_verdict,
            serial_loopback: serial_verdict,
            connectivity: connectivity_verdict,
            aggregate: gpio_verdict.and(serial_verdict).and(connectivity_verdict),
        })
    }

    // ── Shutdown ──────────────────────────────────────────────

    /// Release every claimed descriptor.  Safe on every path — each
    /// lease releases idempotently — and leaves all pins inactive.
    pub fn shutdown<G: GpioPort, E: EventSink>(&mut self, gpio: &mut G, sink: &mut E) {
        info!("harness: shutting down, releasing peripherals");
        sink.emit(&HarnessEvent::ShuttingDown);
        self.phase = Phase::Terminating;

        self.aux.close(gpio);
        for button in &mut self.buttons {
            button.close(gpio);
        }
        self.indicator.close(gpio);
    }
}
