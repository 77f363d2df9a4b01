//! `std` time sources.
//!
//! Used by the desktop simulator and by the ESP-IDF build, where `std` is
//! available on top of FreeRTOS.

use std::time::{Duration, Instant};

use crate::traits::{Clock, Delay};

/// Monotonic clock backed by [`Instant`].
///
/// Time is measured from construction.
#[derive(Clone, Copy, Debug)]
pub struct StdClock {
    start: Instant,
}

impl StdClock {
    /// Creates a clock reading 0 now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Blocking delay backed by [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_clock_is_monotonic() {
        let clock = StdClock::new();
        let a = clock.now_ms();
        StdDelay.delay_ms(2);
        let b = clock.now_ms();
        assert!(b >= a + 2);
    }
}
