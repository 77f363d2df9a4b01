//! ESP32 clock implementation using the ESP-IDF high-resolution timer.

use crate::traits::Clock;

/// ESP32 clock using the hardware timer.
///
/// `esp_timer_get_time()` returns microseconds since boot, so session
/// deadlines measured with this clock survive a Wi-Fi reconnect.
///
/// # Example
///
/// ```ignore
/// use tcp_action::hal::esp32::Esp32Clock;
/// use tcp_action::traits::Clock;
///
/// let clock = Esp32Clock::new();
/// let deadline = clock.now_ms() + 30_000;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        // SAFETY: plain read of the monotonic timer, no side effects
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        (micros / 1000) as u64
    }
}
