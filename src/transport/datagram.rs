//! Best-effort UDP transport.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use super::protocol::Frame;
use super::{Delivery, Transport, TransportError, TransportKind};
use crate::config::Endpoint;

/// Fire-and-forget datagram strategy.
///
/// Each send is a single non-blocking `send_to` of a full 1024-byte frame.
/// There is no acknowledgment and no retry.
pub struct DatagramTransport {
    socket: Option<UdpSocket>,
    target: SocketAddr,
}

impl DatagramTransport {
    pub fn connect(endpoint: &Endpoint) -> Result<Self, TransportError> {
        let target = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|_| TransportError::Resolve(endpoint.to_string()))?
            .next()
            .ok_or_else(|| TransportError::Resolve(endpoint.to_string()))?;
        Self::connect_addr(target)
    }

    pub fn connect_addr(target: SocketAddr) -> Result<Self, TransportError> {
        let bind: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind).map_err(TransportError::Connect)?;
        socket.set_nonblocking(true).map_err(TransportError::Connect)?;
        tracing::debug!(%target, "datagram transport ready");
        Ok(Self {
            socket: Some(socket),
            target,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Transport for DatagramTransport {
    fn send(&mut self, frame: &Frame) -> Result<Delivery, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::Closed)?;
        let buf = frame.encode();
        // WouldBlock means the socket buffer is full; the frame is dropped.
        socket
            .send_to(&buf, self.target)
            .map(|_| Delivery::Fired)
            .map_err(|source| TransportError::Send {
                message_type: frame.message_type(),
                source,
            })
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            tracing::debug!(target = %self.target, "datagram transport closed");
        }
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Datagram
    }
}
