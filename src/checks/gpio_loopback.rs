//! GPIO pair loopback check.
//!
//! Each configured pair is bridged on the carrier.  One pin drives the
//! level pattern while the other reads it back; any mismatch fails the
//! pair.  After the forward pass the roles swap and the pattern runs
//! again, so a pin that can source but not sink (or a half-broken
//! jumper) is still caught.
//!
//! Error split: a *mismatch* is the board under test failing — record
//! and continue.  A pin that cannot be opened, driven, or read is the
//! rig failing — escalate, the remaining results would be meaningless.

use log::{debug, info, warn};

use crate::app::ports::{GpioPort, Level, TimePort};
use crate::config::{GpioPair, TestPlan};
use crate::error::Result;
use crate::guard::PinLease;

use super::Verdict;

/// Run every configured pair, forward then (if configured) reversed.
/// An empty pair list trivially passes without opening anything.
pub fn run_all<G, T>(gpio: &mut G, clock: &mut T, plan: &TestPlan) -> Result<Verdict>
where
    G: GpioPort,
    T: TimePort,
{
    if plan.gpio_pairs.is_empty() {
        return Ok(Verdict::Pass);
    }

    // Hold here so the operator sees the run colours before pins start
    // toggling.
    clock.sleep_ms(plan.pre_check_hold_ms);

    let mut verdict = Verdict::Pass;
    for pair in &plan.gpio_pairs {
        verdict = verdict.and(check_pair(gpio, *pair, &plan.drive_levels)?);
        if plan.test_both_directions {
            verdict = verdict.and(check_pair(gpio, pair.swapped(), &plan.drive_levels)?);
        }
    }

    info!(
        "gpio-loopback: {} pair(s), both_directions={} — {:?}",
        plan.gpio_pairs.len(),
        plan.test_both_directions,
        verdict
    );
    Ok(verdict)
}

/// Drive `pair.drive` through `levels` and verify each step on
/// `pair.sense`.  Both leases are released on every exit path.
pub fn check_pair<G: GpioPort>(gpio: &mut G, pair: GpioPair, levels: &[Level]) -> Result<Verdict> {
    debug!("gpio-loopback: GPIO{} -> GPIO{}", pair.drive, pair.sense);

    let mut drive = PinLease::output(gpio, pair.drive, Level::High)?;
    let mut sense = match PinLease::input(gpio, pair.sense) {
        Ok(lease) => lease,
        Err(e) => {
            drive.release(gpio);
            return Err(e.into());
        }
    };

    let result = drive_and_verify(gpio, &drive, &sense, levels);

    drive.release(gpio);
    sense.release(gpio);
    result
}

fn drive_and_verify<G: GpioPort>(
    gpio: &mut G,
    drive: &PinLease,
    sense: &PinLease,
    levels: &[Level],
) -> Result<Verdict> {
    let mut verdict = Verdict::Pass;

    for &level in levels {
        drive.set(gpio, level)?;
        let observed = sense.read(gpio)?;
        if observed != level {
            warn!(
                "gpio-loopback: FAIL — read {observed:?} from GPIO{}, expected {level:?} (driven on GPIO{})",
                sense.pin(),
                drive.pin()
            );
            verdict = Verdict::Fail;
        }
    }

    Ok(verdict)
}
