//! The action, the codec and the physical input wired together.
//!
//! [`ActionService`] is what both server realizations drive: it knows how
//! to turn a received byte into an action or a reply, and how to turn a
//! debounced input event into an action. It knows nothing about sockets or
//! time.

use log::{debug, info, warn};

use crate::action::ActionController;
use crate::codec::{Decoded, ProtocolCodec};
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::error::ServiceError;
use crate::mode::{Mode, OutputState};
use crate::traits::{ActionPin, Delay, InputLine};

/// Result type for service operations.
pub type ServiceResult<T, P, I> =
    Result<T, ServiceError<<P as ActionPin>::Error, <I as InputLine>::Error>>;

/// Action state machine plus protocol codec plus debouncer.
///
/// # Example
///
/// ```rust
/// use tcp_action::{ActionService, Config, OutputState};
/// use tcp_action::hal::{MockDelay, MockInput, MockPin};
/// use tcp_action::traits::Level;
///
/// let pin = MockPin::new(Level::Low);
/// let input = MockInput::new(Level::High);
/// let mut service =
///     ActionService::new(pin.clone(), input, MockDelay::new(), &Config::default()).unwrap();
///
/// assert_eq!(service.handle_byte(0x01).unwrap(), None);
/// assert_eq!(pin.level(), Level::High);
/// assert_eq!(service.handle_byte(0x03).unwrap(), Some(0x01));
/// assert_eq!(service.state(), OutputState::On);
/// ```
pub struct ActionService<P: ActionPin, I: InputLine, D: Delay> {
    action: ActionController<P, D>,
    input: Debouncer<I, D>,
    codec: ProtocolCodec,
}

impl<P: ActionPin, I: InputLine, D: Delay + Clone> ActionService<P, I, D> {
    /// Drive the pin to its boot level and take the first input sample.
    ///
    /// The configuration is expected to have passed
    /// [`Config::validate`] already.
    pub fn new(pin: P, input: I, delay: D, config: &Config) -> ServiceResult<Self, P, I> {
        let action =
            ActionController::new(pin, delay.clone(), &config.action).map_err(ServiceError::Pin)?;
        let input = Debouncer::new(input, delay, &config.input).map_err(ServiceError::Input)?;
        let codec = ProtocolCodec::new(config.action.mode, config.action.bytes);

        Ok(Self {
            action,
            input,
            codec,
        })
    }
}

impl<P: ActionPin, I: InputLine, D: Delay> ActionService<P, I, D> {
    /// Poll the physical input once and apply its action if it fired.
    ///
    /// Returns the new state when an action was applied.
    pub fn poll_input(&mut self) -> ServiceResult<Option<OutputState>, P, I> {
        if !self.input.poll().map_err(ServiceError::Input)? {
            return Ok(None);
        }

        let request = self.action.physical_request();
        info!("physical input detected: {:?}", request);
        let state = self.action.apply(request).map_err(ServiceError::Pin)?;
        Ok(Some(state))
    }

    /// Handle one byte from the client.
    ///
    /// Returns the reply to send, if any. Unrecognized bytes are ignored.
    pub fn handle_byte(&mut self, byte: u8) -> ServiceResult<Option<u8>, P, I> {
        match self.codec.decode(byte) {
            Decoded::Query => {
                let reply = self.codec.encode_state(self.action.state());
                debug!("query: state={:?} reply={:?}", self.action.state(), reply);
                Ok(reply)
            }
            Decoded::Action(request) => {
                debug!("request {:#04x} -> {:?}", byte, request);
                self.action.apply(request).map_err(ServiceError::Pin)?;
                Ok(None)
            }
            Decoded::Unrecognized => {
                debug!("ignoring unrecognized byte {:#04x}", byte);
                Ok(None)
            }
        }
    }

    /// Poll the input, logging instead of propagating hardware errors.
    pub(crate) fn poll_input_logged(&mut self) {
        if let Err(e) = self.poll_input() {
            warn!("physical input: {}", e);
        }
    }

    /// Handle a byte, logging instead of propagating hardware errors.
    pub(crate) fn handle_byte_logged(&mut self, byte: u8) -> Option<u8> {
        self.handle_byte(byte).unwrap_or_else(|e| {
            warn!("request {:#04x}: {}", byte, e);
            None
        })
    }

    /// Current action state.
    pub fn state(&self) -> OutputState {
        self.action.state()
    }

    /// Active mode.
    pub fn mode(&self) -> Mode {
        self.action.mode()
    }

    /// The action controller.
    pub fn action(&self) -> &ActionController<P, D> {
        &self.action
    }

    /// The debouncer.
    pub fn debouncer(&self) -> &Debouncer<I, D> {
        &self.input
    }

    /// The protocol codec.
    pub fn codec(&self) -> &ProtocolCodec {
        &self.codec
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::config::{ActionConfig, InputConfig};
    use crate::debounce::InputPolicy;
    use crate::hal::{MockDelay, MockInput, MockPin};
    use crate::traits::Level;

    fn service(config: &Config) -> (ActionService<MockPin, MockInput, MockDelay>, MockPin, MockInput) {
        let pin = MockPin::new(Level::Low);
        let input = MockInput::new(Level::High);
        let svc = ActionService::new(pin.clone(), input.clone(), MockDelay::new(), config).unwrap();
        (svc, pin, input)
    }

    // =========================================================================
    // Byte Handling Tests
    // =========================================================================

    #[test]
    fn unrecognized_byte_changes_nothing() {
        let (mut svc, pin, _) = service(&Config::default());
        pin.clear_writes();
        assert_eq!(svc.handle_byte(0x42).unwrap(), None);
        assert_eq!(pin.write_count(), 0);
        assert_eq!(svc.state(), OutputState::Off);
    }

    #[test]
    fn query_reports_state() {
        let (mut svc, _, _) = service(&Config::default());
        assert_eq!(svc.handle_byte(0x03).unwrap(), Some(0x00));
        svc.handle_byte(0x01).unwrap();
        assert_eq!(svc.handle_byte(0x03).unwrap(), Some(0x01));
    }

    #[test]
    fn query_byte_silent_in_toggle_mode() {
        let config =
            Config::default().with_action(ActionConfig::default().with_mode(Mode::Toggle));
        let (mut svc, pin, _) = service(&config);
        pin.clear_writes();
        assert_eq!(svc.handle_byte(0x03).unwrap(), None);
        assert_eq!(pin.write_count(), 0);
    }

    #[test]
    fn pin_failure_is_reported() {
        let (mut svc, pin, _) = service(&Config::default());
        pin.set_failing(true);
        assert!(matches!(svc.handle_byte(0x01), Err(ServiceError::Pin(_))));
        assert_eq!(svc.handle_byte_logged(0x01), None);
    }

    // =========================================================================
    // Physical Input Tests
    // =========================================================================

    #[test]
    fn switch_flips_on_off_state() {
        let config = Config::default()
            .with_input(InputConfig::default().with_policy(InputPolicy::Switch));
        let (mut svc, pin, input) = service(&config);

        assert_eq!(svc.poll_input().unwrap(), None);
        input.set_level(Level::Low);
        assert_eq!(svc.poll_input().unwrap(), Some(OutputState::On));
        assert_eq!(pin.level(), Level::High);
        input.set_level(Level::High);
        assert_eq!(svc.poll_input().unwrap(), Some(OutputState::Off));
    }

    #[test]
    fn input_failure_is_reported() {
        let config = Config::default()
            .with_input(InputConfig::default().with_policy(InputPolicy::Switch));
        let (mut svc, _, input) = service(&config);
        input.set_failing(true);
        assert!(matches!(svc.poll_input(), Err(ServiceError::Input(_))));
    }
}
