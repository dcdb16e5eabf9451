//! Fixture clock adapter.
//!
//! Implements [`TimePort`] — monotonic uptime plus the fixed settling
//! delays the checks depend on.
//!
//! - **`target_os = "espidf"`** — `esp_timer_get_time()` for uptime and
//!   `usleep` for delays (the main task may block; nothing else runs).
//! - **`not(target_os = "espidf")`** — `std::time::Instant` and
//!   `std::thread::sleep` for host runs.

use crate::app::ports::TimePort;

pub struct FixtureClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl FixtureClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimePort for FixtureClock {
    #[cfg(target_os = "espidf")]
    fn sleep_ms(&mut self, ms: u32) {
        // SAFETY: plain libc usleep; the dispatch loop is allowed to
        // block — settling delays are part of the test contract.
        unsafe {
            esp_idf_svc::sys::usleep(ms * 1000);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
