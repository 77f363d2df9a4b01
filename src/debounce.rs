//! Physical input debouncer.
//!
//! Turns raw samples of a button or switch line into discrete events. Each
//! event stands for exactly one action request; which request is decided by
//! the action controller (see
//! [`ActionController::physical_request`](crate::ActionController::physical_request)).
//!
//! # Policies
//!
//! - [`InputPolicy::Switch`]: a latching switch. Any change of level is an
//!   event. No delays.
//! - [`InputPolicy::Button`]: a momentary push button wired active low. A
//!   high-to-low transition is a candidate press; it is confirmed by waiting
//!   out the debounce window and then re-sampling the line.
//! - [`InputPolicy::None`]: no input wired. Never reports an event and never
//!   touches the line.

use log::{debug, trace};

use crate::config::InputConfig;
use crate::traits::{Delay, InputLine, Level};

/// How the input line is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InputPolicy {
    /// No physical input.
    #[default]
    None,
    /// Latching switch: every level change is an event.
    Switch,
    /// Push button: confirmed falling edges are events.
    Button,
}

impl InputPolicy {
    /// Returns the policy as a snake_case string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InputPolicy::None => "none",
            InputPolicy::Switch => "switch",
            InputPolicy::Button => "button",
        }
    }

    /// Parse a policy name, case-insensitively. A `PHYS_` prefix is
    /// accepted, so `PHYS_BUTTON` parses like `button`.
    ///
    /// ```
    /// use tcp_action::InputPolicy;
    ///
    /// assert_eq!(InputPolicy::from_text("Button"), Some(InputPolicy::Button));
    /// assert_eq!(InputPolicy::from_text("PHYS_SWITCH"), Some(InputPolicy::Switch));
    /// assert_eq!(InputPolicy::from_text("knob"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix("PHYS_")
            .or_else(|| s.strip_prefix("phys_"))
            .unwrap_or(s);
        [InputPolicy::None, InputPolicy::Switch, InputPolicy::Button]
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
    }
}

/// Samples an input line and reports qualifying events.
///
/// The only state kept between polls is the last sample taken.
///
/// # Example
///
/// ```rust
/// use tcp_action::{Debouncer, InputPolicy};
/// use tcp_action::config::InputConfig;
/// use tcp_action::hal::{MockDelay, MockInput};
/// use tcp_action::traits::Level;
///
/// let input = MockInput::new(Level::High);
/// let config = InputConfig::default().with_policy(InputPolicy::Switch);
/// let mut debouncer = Debouncer::new(input.clone(), MockDelay::new(), &config).unwrap();
///
/// assert!(!debouncer.poll().unwrap());
/// input.set_level(Level::Low);
/// assert!(debouncer.poll().unwrap());
/// assert!(!debouncer.poll().unwrap());
/// ```
pub struct Debouncer<I: InputLine, D: Delay> {
    input: I,
    delay: D,
    policy: InputPolicy,
    debounce_ms: u32,
    samples: u32,
    last: Level,
}

impl<I: InputLine, D: Delay> Debouncer<I, D> {
    /// Create a debouncer and take the initial sample.
    ///
    /// With [`InputPolicy::None`] the line is never read.
    pub fn new(mut input: I, delay: D, config: &InputConfig) -> Result<Self, I::Error> {
        let last = match config.policy {
            InputPolicy::None => Level::High,
            _ => input.read()?,
        };

        Ok(Self {
            input,
            delay,
            policy: config.policy,
            debounce_ms: config.debounce_ms,
            samples: config.samples,
            last,
        })
    }

    /// Sample the line once and report whether a qualifying event occurred.
    ///
    /// A confirmed button press blocks for the debounce window.
    pub fn poll(&mut self) -> Result<bool, I::Error> {
        match self.policy {
            InputPolicy::None => Ok(false),
            InputPolicy::Switch => self.poll_switch(),
            InputPolicy::Button => self.poll_button(),
        }
    }

    /// Active policy.
    #[inline]
    pub fn policy(&self) -> InputPolicy {
        self.policy
    }

    /// Last sample taken.
    #[inline]
    pub fn last_sample(&self) -> Level {
        self.last
    }

    fn poll_switch(&mut self) -> Result<bool, I::Error> {
        let current = self.input.read()?;
        let changed = current != self.last;
        self.last = current;
        if changed {
            debug!("switch moved to {}", current.as_str());
        }
        Ok(changed)
    }

    fn poll_button(&mut self) -> Result<bool, I::Error> {
        let current = self.input.read()?;
        let candidate = self.last.is_high() && current.is_low();
        self.last = current;
        if !candidate {
            return Ok(false);
        }

        self.delay.delay_ms(self.debounce_ms);

        let mut wrong = 0u32;
        for _ in 0..self.samples {
            if self.input.read()? != current {
                wrong += 1;
            }
        }

        let accepted = wrong < self.samples / 2;
        if accepted {
            debug!("button press confirmed ({}/{} samples off)", wrong, self.samples);
        } else {
            trace!("button bounce rejected ({}/{} samples off)", wrong, self.samples);
        }
        Ok(accepted)
    }
}
