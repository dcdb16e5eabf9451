//! Full-harness cycles against the mock bench.
//!
//! These follow the operator's view: seat a board, watch the run
//! colours, read the settled verdict, press retest.

use boardcheck::app::events::HarnessEvent;
use boardcheck::app::ports::Level;
use boardcheck::app::service::{Harness, Phase};
use boardcheck::checks::{CheckId, Verdict};
use boardcheck::config::{GpioPair, TestPlan};

use crate::mock_hw::{InstantClock, MockBench, MockWifi, RecordingSink};

/// Status indicator pins (fixture wiring).
const RED: i32 = 11;
const GREEN: i32 = 12;

/// A compact plan: one jumpered pair, one UART, two aux LEDs, quick wifi.
fn small_plan() -> TestPlan {
    let mut plan = TestPlan::default();
    plan.gpio_pairs.clear();
    plan.gpio_pairs.push(GpioPair::new(4, 5)).unwrap();
    plan.aux_leds.clear();
    plan.aux_leds.push(35).unwrap();
    plan.aux_leds.push(36).unwrap();
    plan.retest_buttons.clear();
    plan.retest_buttons.push(16).unwrap();
    plan.wifi_connect_attempts = 5;
    plan
}

struct Fixture {
    bench: MockBench,
    wifi: MockWifi,
    clock: InstantClock,
    sink: RecordingSink,
    harness: Harness,
}

fn bring_up(plan: TestPlan) -> Fixture {
    let mut bench = MockBench::new(&plan);
    let harness = Harness::init(&mut bench, plan).expect("init");
    Fixture {
        bench,
        wifi: MockWifi::healthy(),
        clock: InstantClock::new(),
        sink: RecordingSink::new(),
        harness,
    }
}

#[test]
fn healthy_board_goes_green() {
    let mut f = bring_up(small_plan());

    // Power-on arms the initial run without a button press.
    assert!(f.harness.take_retest());

    let verdict = f
        .harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink)
        .unwrap();

    assert_eq!(verdict, Verdict::Pass);
    assert_eq!(f.harness.phase(), Phase::Idle);
    assert_eq!(f.bench.level_of(GREEN), Some(Level::Low), "green lit");
    assert_eq!(f.bench.level_of(RED), Some(Level::High), "red dark");

    // Long-lived claims only: indicator (3) + button (1) + aux (2).
    assert_eq!(f.bench.open_gpio_count(), 6, "check leases all returned");
    assert!(f.bench.uart_open.is_empty(), "serial channel closed");
}

#[test]
fn event_stream_reflects_the_fixed_check_order() {
    let mut f = bring_up(small_plan());
    f.harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink)
        .unwrap();

    let completed: Vec<CheckId> = f
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            HarnessEvent::CheckCompleted { check, .. } => Some(*check),
            _ => None,
        })
        .collect();
    assert_eq!(
        completed,
        vec![
            CheckId::GpioLoopback,
            CheckId::SerialLoopback,
            CheckId::Connectivity
        ]
    );

    assert!(matches!(f.sink.events.first(), Some(HarnessEvent::SuiteStarted { cycle: 1 })));
    match f.sink.events.last() {
        Some(HarnessEvent::SuiteCompleted(report)) => {
            assert_eq!(report.aggregate, Verdict::Pass);
            assert_eq!(report.cycle, 1);
        }
        other => panic!("expected SuiteCompleted last, got {other:?}"),
    }
}

#[test]
fn broken_jumper_fails_aggregate_but_runs_everything() {
    let mut f = bring_up(small_plan());
    // Sense pin stuck high: the Low steps can never read back.
    f.bench.set_input(5, Level::High);

    let verdict = f
        .harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink)
        .unwrap();

    assert_eq!(verdict, Verdict::Fail);
    assert_eq!(f.bench.level_of(RED), Some(Level::Low), "red lit");
    assert_eq!(f.bench.level_of(GREEN), Some(Level::High), "green dark");

    // The failing GPIO check did not stop the rest of the suite.
    assert_eq!(f.wifi.full_runs, 1, "connectivity still ran");
    match f.sink.events.last() {
        Some(HarnessEvent::SuiteCompleted(report)) => {
            assert_eq!(report.gpio_loopback, Verdict::Fail);
            assert_eq!(report.serial_loopback, Verdict::Pass);
            assert_eq!(report.connectivity, Verdict::Pass);
        }
        other => panic!("expected SuiteCompleted, got {other:?}"),
    }
}

#[test]
fn retest_button_edge_arms_exactly_one_run() {
    let mut f = bring_up(small_plan());
    assert!(f.harness.take_retest(), "armed at power-on");
    assert!(!f.harness.take_retest(), "trigger consumed");

    // Released line: no trigger.
    f.harness.poll_inputs(&mut f.bench).unwrap();
    assert!(!f.harness.take_retest());

    // Press edge.
    f.bench.set_input(16, Level::Low);
    f.harness.poll_inputs(&mut f.bench).unwrap();
    assert!(f.harness.take_retest());
    assert!(!f.harness.take_retest(), "consumed again");

    // Held down: no re-trigger until release + press.
    f.harness.poll_inputs(&mut f.bench).unwrap();
    assert!(!f.harness.take_retest());
    f.bench.set_input(16, Level::High);
    f.harness.poll_inputs(&mut f.bench).unwrap();
    f.bench.set_input(16, Level::Low);
    f.harness.poll_inputs(&mut f.bench).unwrap();
    assert!(f.harness.take_retest());
}

#[test]
fn run_once_wifi_is_skipped_on_retest() {
    let mut f = bring_up(small_plan());

    f.harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink)
        .unwrap();
    f.harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink)
        .unwrap();

    assert_eq!(f.harness.cycle(), 2);
    assert_eq!(f.wifi.full_runs, 1, "second cycle replayed the cached verdict");
}

#[test]
fn rig_fault_mid_suite_escalates_and_shutdown_releases_all() {
    let mut f = bring_up(small_plan());
    f.bench.fail_read.insert(5); // sense pin unreadable: rig fault

    let result = f
        .harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink);
    assert!(result.is_err());
    assert_eq!(f.harness.phase(), Phase::Terminating);

    // The failing check already released its own leases.
    assert_eq!(f.bench.open_gpio_count(), 6, "only long-lived claims remain");

    f.harness.shutdown(&mut f.bench, &mut f.sink);
    assert_eq!(f.bench.open_gpio_count(), 0, "every descriptor returned");
    assert!(matches!(f.sink.events.last(), Some(HarnessEvent::ShuttingDown)));
}

#[test]
fn shutdown_parks_aux_leds_inactive() {
    let mut f = bring_up(small_plan());
    f.harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink)
        .unwrap();
    f.harness.shutdown(&mut f.bench, &mut f.sink);

    for pin in [35, 36] {
        assert_eq!(f.bench.level_of(pin), Some(Level::High), "aux LED {pin} parked dark");
    }
    assert_eq!(f.bench.open_gpio_count(), 0);
}

#[test]
fn empty_plan_trivially_passes() {
    let mut plan = small_plan();
    plan.gpio_pairs.clear();
    plan.serial_channels.clear();
    let mut f = bring_up(plan);

    let verdict = f
        .harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink)
        .unwrap();
    // GPIO and serial pass trivially; connectivity still runs for real.
    assert_eq!(verdict, Verdict::Pass);
    assert_eq!(f.wifi.full_runs, 1);
    assert!(f.bench.uart_open.is_empty());
}

#[test]
fn empty_level_pattern_is_rejected_at_init() {
    let mut plan = small_plan();
    plan.drive_levels.clear();
    let mut bench = MockBench::new(&plan);
    assert!(Harness::init(&mut bench, plan).is_err());
    assert_eq!(bench.open_gpio_count(), 0, "nothing claimed before validation");
}

#[test]
fn dead_button_input_is_a_rig_fault() {
    let mut f = bring_up(small_plan());
    f.bench.fail_read.insert(16);
    assert!(f.harness.poll_inputs(&mut f.bench).is_err());
}

#[test]
fn indicator_runs_the_colour_walk_before_checks() {
    let mut f = bring_up(small_plan());
    f.harness
        .run_suite(&mut f.bench, &mut f.wifi, &mut f.clock, &mut f.sink)
        .unwrap();

    // Red channel history: dark at open, lit for the walk's Red step,
    // dark again, then held dark by the Green settle.
    let red_history = &f.bench.history[&RED];
    assert!(red_history.contains(&Level::Low), "red lit during the walk");
    assert_eq!(*red_history.last().unwrap(), Level::High);
}
