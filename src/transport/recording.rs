//! In-memory transport for tests and collector-less dry runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::protocol::Frame;
use super::{Delivery, MessageType, Transport, TransportError, TransportKind};

/// Shared view of the frames a [`RecordingTransport`] has accepted.
///
/// Cloning is cheap; every clone observes the same log.
#[derive(Clone, Default)]
pub struct RecordedFrames {
    frames: Arc<Mutex<Vec<Frame>>>,
    accepted: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
    fail_sends: Arc<AtomicBool>,
}

impl RecordedFrames {
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Frames accepted so far, whether or not they were kept.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn count(&self, message_type: MessageType) -> usize {
        self.frames
            .lock()
            .iter()
            .filter(|f| f.message_type() == message_type)
            .count()
    }

    pub fn last(&self) -> Option<Frame> {
        self.frames.lock().last().cloned()
    }

    pub fn types(&self) -> Vec<MessageType> {
        self.frames.lock().iter().map(Frame::message_type).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Make subsequent sends fail, as an unreachable collector would.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

/// Transport that keeps frames in memory instead of sending them.
pub struct RecordingTransport {
    log: RecordedFrames,
    retain: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            log: RecordedFrames::default(),
            retain: true,
        }
    }

    /// Count frames without keeping them. Memory use stays flat however
    /// long the run is.
    pub fn discarding() -> Self {
        Self {
            log: RecordedFrames::default(),
            retain: false,
        }
    }

    /// Handle for inspecting frames after the transport is moved into a session.
    pub fn frames(&self) -> RecordedFrames {
        self.log.clone()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, frame: &Frame) -> Result<Delivery, TransportError> {
        if self.log.is_closed() {
            return Err(TransportError::Closed);
        }
        if self.log.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Send {
                message_type: frame.message_type(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "injected failure"),
            });
        }
        self.log.accepted.fetch_add(1, Ordering::SeqCst);
        if self.retain {
            self.log.frames.lock().push(frame.clone());
        }
        Ok(Delivery::Fired)
    }

    fn close(&mut self) {
        self.log.closed.store(true, Ordering::SeqCst);
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Recording
    }
}
