//! Action state machine.
//!
//! [`ActionController`] owns the action pin and the single [`OutputState`]
//! that describes it. Nothing else writes the pin.
//!
//! # Example
//!
//! ```rust
//! use tcp_action::{ActionController, ActionRequest, Mode, OutputState};
//! use tcp_action::config::ActionConfig;
//! use tcp_action::hal::{MockDelay, MockPin};
//! use tcp_action::traits::Level;
//!
//! let pin = MockPin::new(Level::Low);
//! let config = ActionConfig::default().with_mode(Mode::OnOff);
//! let mut action = ActionController::new(pin.clone(), MockDelay::new(), &config).unwrap();
//!
//! assert_eq!(action.apply(ActionRequest::Enable).unwrap(), OutputState::On);
//! assert_eq!(pin.level(), Level::High);
//! ```
//!
//! # Pulses Block
//!
//! A pulse holds the pin at its active level for the whole pulse duration
//! by calling [`Delay::delay_ms`]. Nothing else runs in the meantime; the
//! callers rely on this to keep pulses from overlapping.

use log::{debug, warn};

use crate::config::ActionConfig;
use crate::mode::{ActionRequest, Mode, OutputState};
use crate::traits::{ActionPin, Delay, Level};

/// Owns the action pin and its state.
///
/// # Type Parameters
///
/// - `P`: The action pin ([`ActionPin`] trait)
/// - `D`: The blocking delay used for pulses ([`Delay`] trait)
pub struct ActionController<P: ActionPin, D: Delay> {
    pin: P,
    delay: D,
    mode: Mode,
    pulse_ms: u32,
    state: OutputState,
}

impl<P: ActionPin, D: Delay> ActionController<P, D> {
    /// Create a controller and drive the pin to its boot level.
    pub fn new(mut pin: P, delay: D, config: &ActionConfig) -> Result<Self, P::Error> {
        let mode = config.mode;
        let state = mode.boot_state(config.boot_on);
        pin.set_level(mode.level_of(state))?;
        debug!(
            "action pin boot: mode={} state={:?} level={}",
            mode.as_str(),
            state,
            mode.level_of(state).as_str()
        );

        Ok(Self {
            pin,
            delay,
            mode,
            pulse_ms: config.pulse_ms,
            state,
        })
    }

    /// Apply one request and return the resulting state.
    ///
    /// Requests that do not belong to the active mode are ignored.
    pub fn apply(&mut self, request: ActionRequest) -> Result<OutputState, P::Error> {
        if !self.mode.accepts(request) {
            warn!(
                "ignoring {:?}: not an action of mode {}",
                request,
                self.mode.as_str()
            );
            return Ok(self.state);
        }

        match request {
            ActionRequest::Enable => self.drive(OutputState::On)?,
            ActionRequest::Disable => self.drive(OutputState::Off)?,
            ActionRequest::Toggle => self.toggle()?,
            ActionRequest::Pulse => self.pulse()?,
        }
        Ok(self.state)
    }

    /// The request a physical input event stands for, given the current state.
    ///
    /// In the on/off modes the input flips the logical state, so the answer
    /// depends on it.
    pub fn physical_request(&self) -> ActionRequest {
        match self.mode {
            Mode::OnOff | Mode::OnOffInverted => {
                if self.state.is_on() {
                    ActionRequest::Disable
                } else {
                    ActionRequest::Enable
                }
            }
            Mode::Toggle => ActionRequest::Toggle,
            Mode::PulseLow | Mode::PulseHigh => ActionRequest::Pulse,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> OutputState {
        self.state
    }

    /// Active mode.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Pulse hold time in milliseconds.
    #[inline]
    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }

    /// Shared access to the pin.
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Mutable access to the pin.
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }

    /// Release the pin and delay.
    pub fn into_parts(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn drive(&mut self, state: OutputState) -> Result<(), P::Error> {
        let level = self.mode.level_of(state);
        self.pin.set_level(level)?;
        self.state = state;
        debug!("action pin -> {:?} ({})", state, level.as_str());
        Ok(())
    }

    fn toggle(&mut self) -> Result<(), P::Error> {
        let live = self.pin.get_level()?;
        let tracked = self.mode.level_of(self.state);
        if live != tracked {
            warn!(
                "toggle: pin reads {} but last recorded level was {}",
                live.as_str(),
                tracked.as_str()
            );
        }

        let target = !live;
        self.pin.set_level(target)?;
        let readback = self.pin.get_level()?;
        if readback != target {
            warn!(
                "toggle: wrote {} but pin reads back {}",
                target.as_str(),
                readback.as_str()
            );
        }

        self.state = OutputState::Level(readback);
        debug!("action pin toggled -> {}", readback.as_str());
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), P::Error> {
        let active = self.mode.pulse_level();
        let resting: Level = self.mode.level_of(self.state);

        self.pin.set_level(active)?;
        self.delay.delay_ms(self.pulse_ms);
        self.pin.set_level(resting)?;
        debug!(
            "action pin pulsed {} for {} ms",
            active.as_str(),
            self.pulse_ms
        );
        Ok(())
    }
}
