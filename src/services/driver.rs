//! Callback-driven server core.
//!
//! For network stacks that call back into the application (lwIP raw API,
//! async runtimes, ...). The stack owns the sockets and calls:
//!
//! - [`on_accept`](SessionDriver::on_accept) when a client connects
//! - [`on_receive`](SessionDriver::on_receive) for every segment of data
//! - [`on_tick`](SessionDriver::on_tick) from a periodic timer
//! - [`on_disconnect`](SessionDriver::on_disconnect) after the connection is gone
//!
//! Unlike the blocking loop, the physical input is polled on every tick,
//! whether or not a client is connected.

use log::info;

use crate::config::ServerConfig;
use crate::session::{Session, SessionEnd};
use crate::traits::{ActionPin, Clock, Delay, InputLine};

use super::service::ActionService;

/// Session bookkeeping for the callback-driven realization.
///
/// # Example
///
/// ```rust
/// use tcp_action::{ActionService, Config, SessionDriver, SessionEnd};
/// use tcp_action::hal::{MockClock, MockDelay, MockInput, MockPin};
/// use tcp_action::traits::{Clock, Level};
///
/// let config = Config::default();
/// let clock = MockClock::new();
/// let mut service = ActionService::new(
///     MockPin::new(Level::Low),
///     MockInput::new(Level::High),
///     MockDelay::new(),
///     &config,
/// )
/// .unwrap();
///
/// let mut driver = SessionDriver::new(&config.server);
/// assert!(driver.on_accept(0));
///
/// let mut replies = Vec::new();
/// driver.on_receive(&mut service, &clock, &[0x01, 0x03], |r| replies.extend_from_slice(r));
/// assert_eq!(replies, vec![0x01]);
///
/// clock.set(30_001);
/// assert_eq!(driver.on_tick(&mut service, clock.now_ms()), Some(SessionEnd::Timeout));
/// driver.on_disconnect();
/// ```
#[derive(Clone, Debug)]
pub struct SessionDriver {
    session: Session,
}

impl SessionDriver {
    /// Create a driver with the configured client timeout.
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            session: Session::new(config.client_timeout_ms),
        }
    }

    /// A client connected.
    ///
    /// Returns `false` if another client is still being served; the caller
    /// must close the new connection.
    pub fn on_accept(&mut self, now_ms: u64) -> bool {
        if self.session.is_active() {
            info!("rejecting client: session already active");
            return false;
        }
        info!("client connected");
        self.session.open(now_ms);
        true
    }

    /// Data arrived from the client.
    ///
    /// Each byte is handled in order; replies are handed to `reply` as
    /// they are produced. The deadline is refreshed after every byte, from
    /// the time handling finished.
    pub fn on_receive<P, I, D, C, F>(
        &mut self,
        service: &mut ActionService<P, I, D>,
        clock: &C,
        data: &[u8],
        mut reply: F,
    ) where
        P: ActionPin,
        I: InputLine,
        D: Delay,
        C: Clock,
        F: FnMut(&[u8]),
    {
        for &byte in data {
            if let Some(answer) = service.handle_byte_logged(byte) {
                reply(&[answer]);
            }
            self.session.touch(clock.now_ms());
        }
    }

    /// Periodic timer tick.
    ///
    /// Polls the physical input, then checks the session deadline. Returns
    /// [`SessionEnd::Timeout`] when the client must be disconnected.
    pub fn on_tick<P, I, D>(
        &mut self,
        service: &mut ActionService<P, I, D>,
        now_ms: u64,
    ) -> Option<SessionEnd>
    where
        P: ActionPin,
        I: InputLine,
        D: Delay,
    {
        service.poll_input_logged();

        if self.session.is_active() && self.session.check(now_ms) {
            Some(SessionEnd::Timeout)
        } else {
            None
        }
    }

    /// The connection is gone, for whatever reason.
    pub fn on_disconnect(&mut self) {
        if self.session.is_active() {
            info!("client disconnected");
        }
        self.session.close();
    }

    /// Whether a client is being served.
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// The session tracker.
    pub fn session(&self) -> &Session {
        &self.session
    }
}
