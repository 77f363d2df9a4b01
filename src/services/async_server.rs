//! Event-driven server on tokio.
//!
//! A single task multiplexes a periodic tick, the listener and the one
//! connected client with `tokio::select!`, feeding each event into a
//! [`SessionDriver`]. Pulses still block inside the handler, which is the
//! intended serialization: run this on a current-thread runtime.
//!
//! # Example
//!
//! ```rust,no_run
//! use tcp_action::{ActionService, AsyncServer, Config};
//! use tcp_action::hal::{MockInput, MockPin, StdClock, StdDelay};
//! use tcp_action::traits::Level;
//!
//! # async fn demo() -> std::io::Result<()> {
//! let config = Config::default();
//! let service = ActionService::new(
//!     MockPin::new(Level::Low),
//!     MockInput::new(Level::High),
//!     StdDelay,
//!     &config,
//! )
//! .unwrap();
//!
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server.port)).await?;
//! AsyncServer::new(service, StdClock::new(), &config.server)
//!     .run(listener, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::io;
use std::time::Duration;

use log::{info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::MissedTickBehavior;

use crate::config::ServerConfig;
use crate::session::SessionEnd;
use crate::traits::{ActionPin, Clock, Delay, InputLine};

use super::driver::SessionDriver;
use super::service::ActionService;

/// Size of the receive buffer; every byte in it is handled in order.
const READ_BUF: usize = 64;

/// Tokio realization of the callback-driven server.
pub struct AsyncServer<P, I, D, C>
where
    P: ActionPin,
    I: InputLine,
    D: Delay,
    C: Clock,
{
    service: ActionService<P, I, D>,
    driver: SessionDriver,
    clock: C,
    tick: Duration,
}

impl<P, I, D, C> AsyncServer<P, I, D, C>
where
    P: ActionPin,
    I: InputLine,
    D: Delay,
    C: Clock,
{
    /// Create a server; nothing runs until [`run`](Self::run).
    pub fn new(service: ActionService<P, I, D>, clock: C, config: &ServerConfig) -> Self {
        Self {
            service,
            driver: SessionDriver::new(config),
            clock,
            tick: Duration::from_millis(u64::from(config.poll_interval_ms.max(1))),
        }
    }

    /// Serve clients from `listener` until `shutdown` completes.
    ///
    /// Returns the service so callers can inspect the final state.
    pub async fn run<F>(mut self, listener: TcpListener, shutdown: F) -> ActionService<P, I, D>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("event-driven server listening on {}", addr);
        }

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut client: Option<TcpStream> = None;
        let mut buf = [0u8; READ_BUF];

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    let now = self.clock.now_ms();
                    if self.driver.on_tick(&mut self.service, now) == Some(SessionEnd::Timeout) {
                        if let Some(mut stream) = client.take() {
                            let _ = stream.shutdown().await;
                        }
                        self.driver.on_disconnect();
                    }
                }

                accepted = listener.accept(), if client.is_none() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            warn!("set_nodelay failed: {}", e);
                        }
                        info!("accepted {}", peer);
                        if self.driver.on_accept(self.clock.now_ms()) {
                            client = Some(stream);
                        }
                    }
                    Err(e) => warn!("accept failed: {}", e),
                },

                read = read_some(&mut client, &mut buf), if client.is_some() => match read {
                    Ok(0) => {
                        client = None;
                        self.driver.on_disconnect();
                    }
                    Ok(n) => {
                        let mut replies = Vec::new();
                        self.driver.on_receive(
                            &mut self.service,
                            &self.clock,
                            &buf[..n],
                            |r| replies.extend_from_slice(r),
                        );
                        if !replies.is_empty() {
                            if let Err(e) = write_replies(&mut client, &replies).await {
                                warn!("reply failed: {}", e);
                                client = None;
                                self.driver.on_disconnect();
                            }
                        }
                    }
                    Err(e) => {
                        warn!("read failed: {}", e);
                        client = None;
                        self.driver.on_disconnect();
                    }
                },
            }
        }

        if let Some(mut stream) = client.take() {
            let _ = stream.shutdown().await;
        }
        self.service
    }
}

async fn read_some(client: &mut Option<TcpStream>, buf: &mut [u8]) -> io::Result<usize> {
    match client {
        Some(stream) => stream.read(buf).await,
        None => std::future::pending().await,
    }
}

async fn write_replies(client: &mut Option<TcpStream>, bytes: &[u8]) -> io::Result<()> {
    match client {
        Some(stream) => stream.write_all(bytes).await,
        None => Ok(()),
    }
}
