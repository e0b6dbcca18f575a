//! Telemetry transports.
//!
//! A [`Transport`] ships tagged frames to the collector. The strategy is
//! picked once, when the session starts:
//!
//! - [`DatagramTransport`]: fire-and-forget UDP, never blocks the caller.
//! - [`SyncTransport`]: TCP request/reply, blocks until the collector acks.
//! - [`RecordingTransport`]: in-memory, for tests and dry runs.

mod datagram;
pub mod protocol;
mod recording;
mod sync;

use std::str::FromStr;

use thiserror::Error;

use crate::config::{ConfigError, TelemetrySettings};

pub use datagram::DatagramTransport;
pub use protocol::{Frame, HeaderPayload, MessageType, ProtocolError, FRAME_SIZE, MAX_PAYLOAD};
pub use recording::{RecordedFrames, RecordingTransport};
pub use sync::SyncTransport;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Could not resolve collector address {0}")]
    Resolve(String),

    #[error("Could not connect to collector: {0}")]
    Connect(#[source] std::io::Error),

    #[error("Could not send {message_type} message: {source}")]
    Send {
        message_type: MessageType,
        #[source]
        source: std::io::Error,
    },

    #[error("Collector replied {got} to a {expected} message")]
    UnexpectedReply { expected: MessageType, got: u8 },

    #[error("Transport is closed")]
    Closed,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// What the transport can say about a successful send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the network stack; nobody confirmed receipt.
    Fired,
    /// The collector acknowledged the frame.
    Acknowledged,
}

/// Transport strategy selected by the `transport` configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Datagram,
    Synchronous,
    Recording,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Datagram => "udp",
            Self::Synchronous => "tcp",
            Self::Recording => "memory",
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" | "datagram" => Ok(Self::Datagram),
            "tcp" | "sync" | "synchronous" => Ok(Self::Synchronous),
            "memory" | "recording" => Ok(Self::Recording),
            other => Err(other.to_string()),
        }
    }
}

/// Capability to send tagged, length-bounded frames to a collector.
pub trait Transport: Send {
    /// Send one frame. The frame already carries a bounded payload.
    fn send(&mut self, frame: &Frame) -> Result<Delivery, TransportError>;

    /// Release the endpoint. Further sends fail with [`TransportError::Closed`].
    fn close(&mut self);

    fn kind(&self) -> TransportKind;
}

/// Open the transport named by `settings`.
pub fn connect(settings: &TelemetrySettings) -> Result<Box<dyn Transport>, TransportError> {
    match settings.transport {
        TransportKind::Datagram => {
            let endpoint = settings.endpoint()?;
            Ok(Box::new(DatagramTransport::connect(&endpoint)?))
        }
        TransportKind::Synchronous => {
            let endpoint = settings.endpoint()?;
            Ok(Box::new(SyncTransport::connect(&endpoint)?))
        }
        TransportKind::Recording => Ok(Box::new(dry_run())),
    }
}

/// Transport for `transport=memory`: nobody can read the frames back, so
/// only counts are kept.
fn dry_run() -> RecordingTransport {
    RecordingTransport::discarding()
}
