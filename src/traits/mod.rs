//! Trait definitions for hardware and network abstraction.
//!
//! This module defines the collaborator interfaces the core consumes:
//!
//! - `hardware`: action pin, input line, clock, blocking delay
//! - `network`: listener and connection for the TCP server
//!
//! Concrete implementations live in [`crate::hal`] (mocks, std host,
//! embedded-hal adapters, ESP32) and [`crate::services`] (std sockets).

pub mod hardware;
pub mod network;

pub use hardware::*;
pub use network::*;
