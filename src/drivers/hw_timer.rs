//! Input-poll timer using ESP-IDF's esp_timer API.
//!
//! One periodic timer pushes [`Event::InputPollTick`] into the lock-free
//! queue so the dispatch loop samples the retest buttons on a fixed
//! cadence.  The callback runs in the esp_timer task context (not ISR),
//! so push_event's atomics are more than enough.
//!
//! On simulation targets the dispatch loop paces itself with a sleep and
//! pushes its own ticks, so nothing is started here.

#[allow(unused_imports)]
use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut POLL_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn poll_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::InputPollTick);
}

/// Start the retest-button poll timer at `period_ms`.
#[cfg(target_os = "espidf")]
pub fn start_poll_timer(period_ms: u32) {
    // SAFETY: POLL_TIMER is written here once at boot from the single
    // main-task context before any callback fires.  The callback only
    // calls push_event(), which is ISR-safe.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(poll_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"input_poll\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&args, &raw mut POLL_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: poll timer create failed (rc={}) — retest buttons will be dead",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(POLL_TIMER, u64::from(period_ms) * 1000);
        if ret != ESP_OK {
            log::error!("hw_timer: poll timer start failed (rc={})", ret);
            return;
        }
        info!("hw_timer: input poll started at {period_ms}ms");
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_poll_timer(_period_ms: u32) {
    log::info!("hw_timer(sim): ticks driven by the sleep loop");
}

/// Stop the poll timer.
#[cfg(target_os = "espidf")]
pub fn stop_poll_timer() {
    // SAFETY: POLL_TIMER is a valid handle if start succeeded; the
    // null-check prevents stopping a never-created timer.
    unsafe {
        if !POLL_TIMER.is_null() {
            esp_timer_stop(POLL_TIMER);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_poll_timer() {}
