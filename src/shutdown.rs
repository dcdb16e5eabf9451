//! Process-wide termination flag.
//!
//! Set from asynchronous contexts (signal glue, panic hook, fatal
//! peripheral errors) and polled by the dispatch loop at the top of
//! each iteration.  The transition is monotonic — once requested,
//! termination is never rescinded — and the flag is a single atomic so
//! it is safe to set from any context, including interrupt handlers.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::events::{push_event, Event};

static TERMINATION_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Request shutdown.  Safe from signal/ISR context; also enqueues a
/// wake-up event so an idle dispatch loop notices promptly.
pub fn request() {
    TERMINATION_REQUESTED.store(true, Ordering::Release);
    push_event(Event::TerminateRequested);
}

/// Whether shutdown has been requested.  Checked at dispatch-loop poll
/// points; in-flight settling delays run to completion first.
pub fn is_requested() -> bool {
    TERMINATION_REQUESTED.load(Ordering::Acquire)
}
