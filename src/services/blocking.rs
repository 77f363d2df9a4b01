//! Blocking single-threaded server loop.
//!
//! Each [`step`](BlockingServer::step) polls the physical input once, then
//! tries to accept a client. An accepted client is served to completion:
//! until it disconnects or stays idle past the timeout. The physical input
//! is not polled while a client is being served.
//!
//! This is the natural shape for a bare-metal main loop or an ESP-IDF task.

use log::{info, trace, warn};

use crate::config::ServerConfig;
use crate::session::{Session, SessionEnd};
use crate::traits::{ActionPin, Clock, Connection, Delay, InputLine, Listener, ReadOutcome};

use super::service::ActionService;

/// Blocking realization of the server.
///
/// # Type Parameters
///
/// - `L`: Listening socket ([`Listener`] trait)
/// - `C`: Time source for session deadlines ([`Clock`] trait)
/// - `P`, `I`, `D`: Action pin, input line and delay of the [`ActionService`]
///
/// # Example
///
/// ```rust
/// use tcp_action::{ActionService, BlockingServer, Config, SessionEnd};
/// use tcp_action::hal::{MockClock, MockConnection, MockDelay, MockInput, MockListener, MockPin};
/// use tcp_action::traits::Level;
///
/// let config = Config::default();
/// let clock = MockClock::new();
/// let delay = MockDelay::new().with_clock(clock.clone());
/// let pin = MockPin::new(Level::Low);
/// let service =
///     ActionService::new(pin.clone(), MockInput::new(Level::High), delay.clone(), &config).unwrap();
///
/// let listener = MockListener::new();
/// let client = MockConnection::new();
/// client.send(&[0x01]);
/// client.hang_up();
/// listener.queue(client.clone());
///
/// let mut server = BlockingServer::new(listener, clock, delay, service, &config.server);
/// assert_eq!(server.step(), Some(SessionEnd::PeerDisconnect));
/// assert_eq!(pin.level(), Level::High);
/// assert!(client.is_closed());
/// ```
pub struct BlockingServer<L, C, P, I, D>
where
    L: Listener,
    C: Clock,
    P: ActionPin,
    I: InputLine,
    D: Delay,
{
    listener: L,
    clock: C,
    delay: D,
    service: ActionService<P, I, D>,
    session: Session,
    poll_interval_ms: u32,
}

impl<L, C, P, I, D> BlockingServer<L, C, P, I, D>
where
    L: Listener,
    C: Clock,
    P: ActionPin,
    I: InputLine,
    D: Delay,
{
    /// Create a server around an already-bound listener.
    ///
    /// `delay` is used to wait between polls of an idle client.
    pub fn new(
        listener: L,
        clock: C,
        delay: D,
        service: ActionService<P, I, D>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            listener,
            clock,
            delay,
            service,
            session: Session::new(config.client_timeout_ms),
            poll_interval_ms: config.poll_interval_ms,
        }
    }

    /// Run forever.
    pub fn run(&mut self) -> ! {
        self.run_with(|| {})
    }

    /// Run forever, calling `idle` on every iteration that found no client.
    ///
    /// The firmware uses this to keep the network link up between sessions.
    pub fn run_with<F: FnMut()>(&mut self, mut idle: F) -> ! {
        info!("blocking server running");
        loop {
            self.tick(&mut idle);
        }
    }

    /// One iteration of [`run_with`](Self::run_with).
    ///
    /// Steps once; without a client, calls `idle` and waits one poll
    /// interval.
    pub fn tick<F: FnMut()>(&mut self, idle: &mut F) -> Option<SessionEnd> {
        let end = self.step();
        if end.is_none() {
            idle();
            self.delay.delay_ms(self.poll_interval_ms);
        }
        end
    }

    /// One iteration: poll the input, then serve at most one client.
    ///
    /// Returns how the session ended if a client was served.
    pub fn step(&mut self) -> Option<SessionEnd> {
        self.service.poll_input_logged();

        match self.listener.accept() {
            Ok(Some(conn)) => Some(self.serve(conn)),
            Ok(None) => None,
            Err(e) => {
                warn!("accept failed: {:?}", e);
                None
            }
        }
    }

    /// Serve one client until it disconnects or times out, then close it.
    pub fn serve(&mut self, mut conn: L::Connection) -> SessionEnd {
        info!("client connected");
        self.session.open(self.clock.now_ms());

        let end = loop {
            if self.session.check(self.clock.now_ms()) {
                break SessionEnd::Timeout;
            }

            match conn.read_byte() {
                Ok(ReadOutcome::Byte(byte)) => {
                    if let Some(reply) = self.service.handle_byte_logged(byte) {
                        if let Err(e) = conn.write(&[reply]) {
                            warn!("reply failed: {:?}", e);
                            break SessionEnd::PeerDisconnect;
                        }
                    }
                    self.session.touch(self.clock.now_ms());
                }
                Ok(ReadOutcome::WouldBlock) => {
                    trace!("awaiting data...");
                    self.delay.delay_ms(self.poll_interval_ms);
                }
                Ok(ReadOutcome::Closed) => break SessionEnd::PeerDisconnect,
                Err(e) => {
                    warn!("read failed: {:?}", e);
                    break SessionEnd::PeerDisconnect;
                }
            }
        };

        if end == SessionEnd::PeerDisconnect {
            info!("client disconnected");
        }
        conn.close();
        self.session.close();
        end
    }

    /// The wrapped service.
    pub fn service(&self) -> &ActionService<P, I, D> {
        &self.service
    }

    /// The session tracker.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::config::{Config, InputConfig};
    use crate::debounce::InputPolicy;
    use crate::hal::{MockClock, MockConnection, MockDelay, MockInput, MockListener, MockPin};
    use crate::traits::Level;

    type TestServer = BlockingServer<MockListener, MockClock, MockPin, MockInput, MockDelay>;

    fn server(config: &Config) -> (TestServer, MockListener, MockClock, MockInput) {
        let clock = MockClock::new();
        let delay = MockDelay::new().with_clock(clock.clone());
        let input = MockInput::new(Level::High);
        let service = ActionService::new(
            MockPin::new(Level::Low),
            input.clone(),
            delay.clone(),
            config,
        )
        .unwrap();
        let listener = MockListener::new();
        let srv = BlockingServer::new(listener.clone(), clock.clone(), delay, service, &config.server);
        (srv, listener, clock, input)
    }

    #[test]
    fn step_without_client_returns_none() {
        let (mut srv, _, _, _) = server(&Config::default());
        assert_eq!(srv.step(), None);
        assert!(!srv.session().is_active());
    }

    #[test]
    fn read_error_ends_as_disconnect() {
        let (mut srv, listener, _, _) = server(&Config::default());
        let client = MockConnection::new();
        client.fail_read();
        listener.queue(client.clone());
        assert_eq!(srv.step(), Some(SessionEnd::PeerDisconnect));
        assert!(client.is_closed());
    }

    #[test]
    fn input_not_polled_during_session() {
        let config = Config::default()
            .with_input(InputConfig::default().with_policy(InputPolicy::Switch));
        let (mut srv, listener, _, input) = server(&config);
        let reads_at_start = input.read_count();

        let client = MockConnection::new();
        client.idle(50);
        client.hang_up();
        listener.queue(client);

        srv.step();
        // One poll per step, none while the client was served
        assert_eq!(input.read_count(), reads_at_start + 1);
    }

    #[test]
    fn idle_hook_runs_only_without_client() {
        let (mut srv, listener, clock, _) = server(&Config::default());
        let mut idles = 0;

        assert_eq!(srv.tick(&mut || idles += 1), None);
        assert_eq!(srv.tick(&mut || idles += 1), None);
        assert_eq!(idles, 2);
        assert_eq!(clock.now_ms(), 20, "one poll interval per idle tick");

        let client = MockConnection::new();
        client.send(&[0x01]);
        client.hang_up();
        listener.queue(client);

        let before = clock.now_ms();
        assert_eq!(srv.tick(&mut || idles += 1), Some(SessionEnd::PeerDisconnect));
        assert_eq!(idles, 2, "not called after serving a client");
        assert_eq!(clock.now_ms(), before);
    }

    #[test]
    fn timeout_resets_session_for_next_client() {
        let config = Config::default()
            .with_server(ServerConfig::default().with_client_timeout_ms(100));
        let (mut srv, listener, clock, _) = server(&config);

        listener.queue(MockConnection::new());
        assert_eq!(srv.step(), Some(SessionEnd::Timeout));
        assert!(clock.now_ms() > 100);
        assert!(!srv.session().is_active());

        let next = MockConnection::new();
        next.send(&[0x03]);
        next.hang_up();
        listener.queue(next.clone());
        assert_eq!(srv.step(), Some(SessionEnd::PeerDisconnect));
        assert_eq!(next.written(), vec![0x00]);
    }
}
