//! Dispatch-loop event system.
//!
//! Events are produced by:
//! - the periodic input-poll timer (esp_timer callback on device, the
//!   sleep loop on host)
//! - the termination path (signal glue / fatal peripheral errors)
//!
//! Events are consumed by the dispatch loop in `main`, one at a time,
//! in FIFO order.  While a test run is in progress the loop is not
//! serviced, so a full queue drops new ticks rather than blocking —
//! the next tick after the run completes re-samples the buttons anyway.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Poll timer  │────▶│  Event Queue │────▶│ Dispatch loop │
//! │ Term. glue  │────▶│  (lock-free) │     │  (consumer)   │
//! └─────────────┘     └──────────────┘     └───────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 32;

/// Dispatch events, ordered by rough priority.
/// Lower discriminant = higher priority when several are pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Shutdown has been requested; drain and exit.
    TerminateRequested = 0,
    /// Periodic retest-button sampling tick.
    InputPollTick = 10,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Timer-task context writes (produce), dispatch loop reads (consume).
// Atomic head/tail indices; the buffer lives in a static so the timer
// callback can reach it.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is accessed under the SPSC discipline enforced by
// the atomics above.  Producer (push_event): timer-task context — one
// writer.  Consumer (pop_event): dispatch loop — one reader.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from timer-callback context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; the head slot is not visible to the
    // consumer until the Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the dispatch loop (single consumer).
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback, FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check whether the queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::TerminateRequested),
        10 => Some(Event::InputPollTick),
        _ => None,
    }
}
