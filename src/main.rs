//! BoardCheck Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single-threaded dispatch loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  BenchAdapter        WifiAdapter      FixtureClock           │
//! │  (GpioPort+SerialPort) (WifiPort)     (TimePort)             │
//! │  LogEventSink                                                │
//! │  (EventSink)                                                 │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ────────────────       │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │               Harness (pure logic)                   │    │
//! │  │  retest trigger · check sequence · verdict · leases  │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                                                              │
//! │  Event queue (poll ticks) · shutdown flag (poll points)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop blocks for the whole duration of a test cycle; retest
//! presses during a run are dropped until the first poll tick after it
//! completes.  That is deliberate — the fixture has exactly one board
//! seated at a time.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use boardcheck::adapters::hardware::BenchAdapter;
use boardcheck::adapters::log_sink::LogEventSink;
use boardcheck::adapters::time::FixtureClock;
use boardcheck::adapters::wifi::WifiAdapter;
use boardcheck::app::service::Harness;
use boardcheck::config::TestPlan;
use boardcheck::events::{self, Event};
use boardcheck::app::ports::TimePort;
use boardcheck::{drivers, shutdown};

fn main() -> Result<()> {
    // ── 1. Platform bootstrap ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("BoardCheck acceptance-test harness v{} starting", env!("CARGO_PKG_VERSION"));

    let plan = TestPlan::default();
    let poll_ms = plan.input_poll_ms;

    // ── 2. Construct adapters ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    let mut hw = {
        boardcheck::adapters::wifi::start_station()
            .map_err(|e| anyhow::anyhow!("wifi bring-up failed: {e}"))?;
        BenchAdapter::new()
    };
    #[cfg(not(target_os = "espidf"))]
    let mut hw = BenchAdapter::new(&plan);

    let mut wifi = WifiAdapter::new();
    let mut clock = FixtureClock::new();
    let mut sink = LogEventSink::new();

    // ── 3. Claim long-lived peripherals ───────────────────────
    // The harness arms its own initial run: the suite executes once at
    // power-on before any button press.
    let mut harness = Harness::init(&mut hw, plan)
        .map_err(|e| anyhow::anyhow!("peripheral init failed: {e}"))?;

    drivers::hw_timer::start_poll_timer(poll_ms);

    info!("System ready. Entering dispatch loop.");

    // ── 4. Dispatch loop ──────────────────────────────────────
    loop {
        // Termination is only observed here, between handlers.
        if shutdown::is_requested() {
            break;
        }

        if harness.take_retest() {
            match harness.run_suite(&mut hw, &mut wifi, &mut clock, &mut sink) {
                Ok(verdict) => {
                    info!("cycle {} settled: {:?}", harness.cycle(), verdict);
                }
                Err(e) => {
                    error!("unrecoverable peripheral fault: {e}");
                    shutdown::request();
                    continue;
                }
            }
        }

        // Wait for the next tick.  On device the esp_timer callback
        // enqueues poll ticks; the host loop paces itself and pushes
        // its own.
        clock.sleep_ms(poll_ms);
        #[cfg(not(target_os = "espidf"))]
        events::push_event(Event::InputPollTick);

        let mut poll_fault = None;
        events::drain_events(|event| match event {
            Event::InputPollTick => {
                if poll_fault.is_none() {
                    if let Err(e) = harness.poll_inputs(&mut hw) {
                        poll_fault = Some(e);
                    }
                }
            }
            // The flag is already set; the top of the loop exits.
            Event::TerminateRequested => {}
        });

        if let Some(e) = poll_fault {
            error!("retest input unreadable: {e}");
            shutdown::request();
        }
    }

    // ── 5. Shutdown ───────────────────────────────────────────
    drivers::hw_timer::stop_poll_timer();
    harness.shutdown(&mut hw, &mut sink);
    info!("Application exiting.");
    Ok(())
}
