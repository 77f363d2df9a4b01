//! Network abstraction traits for the single-connection TCP server.
//!
//! The core never talks to a socket API directly. Realization (a), the
//! blocking loop, is written against [`Listener`] and [`Connection`];
//! implementations exist for `std::net` (desktop and ESP-IDF) and for the
//! mocks.
//!
//! # Wire Protocol
//!
//! ```text
//! client -> 0x01          enable / toggle / pulse (mode dependent)
//! client -> 0x00          disable (on/off modes)
//! client -> 0x03          query state (on/off modes)
//! server -> 0x00 | 0x01   reply to a query
//! ```

/// Result of a single non-blocking read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One byte arrived.
    Byte(u8),
    /// No data available right now.
    WouldBlock,
    /// The peer closed the connection.
    Closed,
}

/// An accepted client connection.
///
/// # Implementation Notes
///
/// - `read_byte` must never block for longer than a poll interval
/// - `close` must be safe to call on an already-closed connection
pub trait Connection {
    /// Error type for connection I/O.
    type Error: core::fmt::Debug;

    /// Read at most one byte without blocking.
    fn read_byte(&mut self) -> Result<ReadOutcome, Self::Error>;

    /// Write a reply.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Close the connection.
    fn close(&mut self);
}

/// A listening socket that hands out one connection at a time.
pub trait Listener {
    /// Connection type produced by [`accept`](Self::accept).
    type Connection: Connection;
    /// Error type for accepting.
    type Error: core::fmt::Debug;

    /// Accept a pending connection, if any (non-blocking).
    fn accept(&mut self) -> Result<Option<Self::Connection>, Self::Error>;
}
