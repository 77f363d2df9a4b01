//! Hardware abstraction traits for the action pin, the physical input line,
//! and time.
//!
//! These are the GPIO and clock collaborators the core consumes. Everything
//! above them (action state machine, debouncer, session handling) is written
//! against these traits only, so it runs unchanged on ESP32 and against the
//! mocks on desktop.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`ActionPin`] | Drive and read back the action pin |
//! | [`InputLine`] | Sample the button/switch line |
//! | [`Clock`] | Monotonic millisecond time source |
//! | [`Delay`] | Blocking delay (pulse hold, debounce window) |
//!
//! # Example
//!
//! ```rust
//! use tcp_action::traits::{ActionPin, Level};
//! use tcp_action::hal::MockPin;
//!
//! let mut pin = MockPin::new(Level::Low);
//! pin.set_level(Level::High).unwrap();
//! assert_eq!(pin.get_level().unwrap(), Level::High);
//! ```

use core::fmt::Debug;
use core::ops::Not;

/// Electrical level of a digital line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Logic 0.
    #[default]
    Low,
    /// Logic 1.
    High,
}

impl Level {
    /// Returns `true` for [`Level::High`].
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// Returns `true` for [`Level::Low`].
    #[inline]
    pub const fn is_low(self) -> bool {
        matches!(self, Level::Low)
    }

    /// Level for a boolean where `true` means high.
    ///
    /// ```
    /// use tcp_action::traits::Level;
    ///
    /// assert_eq!(Level::from_high(true), Level::High);
    /// assert_eq!(Level::from_high(false), Level::Low);
    /// ```
    #[inline]
    pub const fn from_high(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }

    /// Returns the level as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::High => "high",
        }
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// The output pin an action drives.
///
/// `get_level` must report the level the pin is actually at. On most MCUs
/// this is the output latch or an input-output pad read; platforms that
/// cannot read back an output should return the last level written.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use tcp_action::traits::{ActionPin, Level};
///
/// struct Relay { /* register handle */ }
///
/// impl ActionPin for Relay {
///     type Error = ();
///
///     fn set_level(&mut self, level: Level) -> Result<(), ()> {
///         // write GPIO_OUT register...
///         Ok(())
///     }
///
///     fn get_level(&mut self) -> Result<Level, ()> {
///         // read GPIO_OUT register...
///         Ok(Level::Low)
///     }
/// }
/// ```
pub trait ActionPin {
    /// Error type for pin operations.
    type Error: Debug;

    /// Drive the pin to `level`.
    fn set_level(&mut self, level: Level) -> Result<(), Self::Error>;

    /// Read the pin's current electrical level.
    fn get_level(&mut self) -> Result<Level, Self::Error>;
}

/// A digital input line wired to a push button or a latching switch.
///
/// Lines are expected to idle high (pull-up) and be pulled low when the
/// button is pressed.
pub trait InputLine {
    /// Error type for sampling.
    type Error: Debug;

    /// Sample the line once.
    fn read(&mut self) -> Result<Level, Self::Error>;
}

/// An absent input line: `None` always reads high, the idle level of a
/// pulled-up line.
///
/// ```
/// use tcp_action::traits::{InputLine, Level};
/// use tcp_action::hal::MockInput;
///
/// let mut unused: Option<MockInput> = None;
/// assert_eq!(unused.read().unwrap(), Level::High);
/// ```
impl<T: InputLine> InputLine for Option<T> {
    type Error = T::Error;

    fn read(&mut self) -> Result<Level, T::Error> {
        match self {
            Some(line) => line.read(),
            None => Ok(Level::High),
        }
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for session deadlines.
///
/// # Example
///
/// ```rust
/// use tcp_action::traits::Clock;
/// use tcp_action::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

/// Blocking delay.
///
/// Used for the pulse hold and the button debounce window. While a delay
/// runs the caller services nothing else; that is the contract pulse
/// actions rely on.
pub trait Delay {
    /// Block for the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Level Tests
    // =========================================================================

    #[test]
    fn level_default_is_low() {
        assert_eq!(Level::default(), Level::Low);
    }

    #[test]
    fn level_not() {
        assert_eq!(!Level::Low, Level::High);
        assert_eq!(!Level::High, Level::Low);
        assert_eq!(!!Level::High, Level::High);
    }

    #[test]
    fn level_predicates() {
        assert!(Level::High.is_high());
        assert!(!Level::High.is_low());
        assert!(Level::Low.is_low());
        assert!(!Level::Low.is_high());
    }

    #[test]
    fn level_as_str() {
        assert_eq!(Level::Low.as_str(), "low");
        assert_eq!(Level::High.as_str(), "high");
    }

    // =========================================================================
    // Trait Object Tests
    // =========================================================================

    struct LatchPin {
        latch: Level,
        writes: usize,
    }

    impl ActionPin for LatchPin {
        type Error = ();

        fn set_level(&mut self, level: Level) -> Result<(), ()> {
            self.latch = level;
            self.writes += 1;
            Ok(())
        }

        fn get_level(&mut self) -> Result<Level, ()> {
            Ok(self.latch)
        }
    }

    #[test]
    fn action_pin_readback_follows_writes() {
        let mut pin = LatchPin {
            latch: Level::Low,
            writes: 0,
        };
        pin.set_level(Level::High).unwrap();
        assert_eq!(pin.get_level().unwrap(), Level::High);
        pin.set_level(Level::High).unwrap();
        assert_eq!(pin.writes, 2);
    }
}
