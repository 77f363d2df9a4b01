//! Server realizations for the TCP action protocol.
//!
//! Both realizations drive the same [`ActionService`] and honor the same
//! contract: one client at a time, one byte per request, idle clients
//! dropped after the configured timeout.
//!
//! - `blocking`: a single loop that alternates between polling the
//!   physical input and serving one client to completion. Runs on any
//!   [`Listener`](crate::traits::Listener), including `no_std` stacks.
//! - `driver`: callbacks for accept, receive, tick and disconnect, for
//!   stacks that call into the application. The input is polled on ticks.
//! - `tcp` (`std` feature): non-blocking `std::net` sockets for `blocking`.
//! - `async_server` (`tokio-server` feature): `driver` on a tokio event loop.
//!
//! ```ignore
//! use tcp_action::services::{BlockingServer, StdListener};
//!
//! let listener = StdListener::bind(("0.0.0.0", config.server.port))?;
//! BlockingServer::new(listener, clock, delay, service, &config.server).run();
//! ```

pub mod blocking;
pub mod driver;
pub mod service;

#[cfg(feature = "std")]
pub mod tcp;

#[cfg(feature = "tokio-server")]
pub mod async_server;

// Re-exports
pub use blocking::*;
pub use driver::*;
pub use service::*;

#[cfg(feature = "std")]
pub use tcp::*;

#[cfg(feature = "tokio-server")]
pub use async_server::*;
