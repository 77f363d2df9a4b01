//! `std::net` sockets for the blocking server.
//!
//! Both the listener and accepted streams are non-blocking, so neither
//! `accept` nor `read_byte` ever stalls the loop. Works on desktop and on
//! ESP-IDF, whose lwIP port backs `std::net`.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use log::{info, warn};

use crate::traits::{Connection, Listener, ReadOutcome};

/// Non-blocking TCP listener.
#[derive(Debug)]
pub struct StdListener {
    inner: TcpListener,
}

impl StdListener {
    /// Bind and switch the socket to non-blocking mode.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let inner = TcpListener::bind(addr)?;
        inner.set_nonblocking(true)?;
        info!("listening on {}", inner.local_addr()?);
        Ok(Self { inner })
    }

    /// Address actually bound (useful after binding port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

impl Listener for StdListener {
    type Connection = StdConnection;
    type Error = io::Error;

    fn accept(&mut self) -> io::Result<Option<StdConnection>> {
        match self.inner.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(true)?;
                if let Err(e) = stream.set_nodelay(true) {
                    warn!("set_nodelay failed: {}", e);
                }
                info!("accepted {}", peer);
                Ok(Some(StdConnection { stream, peer }))
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Non-blocking accepted TCP stream.
#[derive(Debug)]
pub struct StdConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl StdConnection {
    /// Remote address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for StdConnection {
    type Error = io::Error;

    fn read_byte(&mut self) -> io::Result<ReadOutcome> {
        let mut buf = [0u8; 1];
        match self.stream.read(&mut buf) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(_) => Ok(ReadOutcome::Byte(buf[0])),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Ok(ReadOutcome::WouldBlock)
            }
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn close(&mut self) {
        // NotConnected after the peer already left is expected
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
