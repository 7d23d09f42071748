//! Opening one stream per operation.

use std::io::{self, Read, Write};
use std::net::TcpStream;

/// Opens a fresh stream to the server for each exchange.
///
/// The session drops the returned stream as soon as the exchange ends, which
/// closes the connection.
pub trait Connector {
    type Stream: Read + Write;

    /// Opens a new connection.
    fn connect(&mut self) -> io::Result<Self::Stream>;
}

impl<C: Connector + ?Sized> Connector for &mut C {
    type Stream = C::Stream;

    fn connect(&mut self) -> io::Result<Self::Stream> {
        (**self).connect()
    }
}

/// Dials a TCP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpConnector {
    address: String,
}

impl TcpConnector {
    /// Creates a connector for `address` (`host:port`).
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Returns the address dialled on every connect.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&mut self) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(self.address.as_str())?;
        // Requests are a single small write; don't hold them back.
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}
