//! Blocking request/reply transport over TCP.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use super::protocol::Frame;
use super::{Delivery, Transport, TransportError, TransportKind};
use crate::config::Endpoint;

/// Synchronous round-trip strategy.
///
/// Writes one full frame and blocks until the collector answers with a
/// single byte echoing the message tag. There is no timeout: a stalled
/// collector stalls the benchmark loop.
pub struct SyncTransport {
    stream: Option<TcpStream>,
    peer: SocketAddr,
}

impl SyncTransport {
    pub fn connect(endpoint: &Endpoint) -> Result<Self, TransportError> {
        let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|_| TransportError::Resolve(endpoint.to_string()))?
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::Resolve(endpoint.to_string()));
        }
        let stream = TcpStream::connect(&addrs[..]).map_err(TransportError::Connect)?;
        Self::from_stream(stream)
    }

    pub fn connect_addr(addr: SocketAddr) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).map_err(TransportError::Connect)?;
        Self::from_stream(stream)
    }

    fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        stream.set_nodelay(true).map_err(TransportError::Connect)?;
        let peer = stream.peer_addr().map_err(TransportError::Connect)?;
        tracing::debug!(%peer, "synchronous transport connected");
        Ok(Self {
            stream: Some(stream),
            peer,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for SyncTransport {
    fn send(&mut self, frame: &Frame) -> Result<Delivery, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;
        let message_type = frame.message_type();
        let buf = frame.encode();
        let io = |source| TransportError::Send {
            message_type,
            source,
        };

        stream.write_all(&buf).map_err(io)?;
        let mut ack = [0u8; 1];
        stream.read_exact(&mut ack).map_err(io)?;
        if ack[0] != message_type.tag() {
            return Err(TransportError::UnexpectedReply {
                expected: message_type,
                got: ack[0],
            });
        }
        Ok(Delivery::Acknowledged)
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            tracing::debug!(peer = %self.peer, "synchronous transport closed");
        }
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Synchronous
    }
}

impl Drop for SyncTransport {
    fn drop(&mut self) {
        self.close();
    }
}
