//! Wire format for telemetry frames.
//!
//! Every frame occupies exactly [`FRAME_SIZE`] bytes on the wire:
//! `[tag: u8][payload: up to 1023 bytes][zero padding]`.
//!
//! The `CREATE_HEADER` payload is
//! `[name_len: u8][benchmark name][test info]` with no separator.

use thiserror::Error;

/// Size of every frame on the wire.
pub const FRAME_SIZE: usize = 1024;

/// Largest payload that fits after the tag byte.
pub const MAX_PAYLOAD: usize = FRAME_SIZE - 1;

/// Largest benchmark name the header length prefix can describe.
pub const MAX_BENCHMARK_NAME: usize = u8::MAX as usize;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown message type tag: {0}")]
    UnknownMessageType(u8),

    #[error("Empty frame")]
    EmptyFrame,

    #[error("Benchmark name too long: {len} bytes (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("Header truncated: name length {declared}, only {available} bytes available")]
    HeaderTruncated { declared: usize, available: usize },
}

/// Message type tag, byte 0 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    CreateHeader = 0,
    IterationTime = 1,
    ErrorDetail = 2,
    InfoDetail = 3,
    SdcEnd = 4,
    TooManyErrorsPerIteration = 5,
    TooManyInfosPerIteration = 6,
    NormalEnd = 7,
    SameErrorLastIteration = 8,
}

impl MessageType {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateHeader => "CREATE_HEADER",
            Self::IterationTime => "ITERATION_TIME",
            Self::ErrorDetail => "ERROR_DETAIL",
            Self::InfoDetail => "INFO_DETAIL",
            Self::SdcEnd => "SDC_END",
            Self::TooManyErrorsPerIteration => "TOO_MANY_ERRORS_PER_ITERATION",
            Self::TooManyInfosPerIteration => "TOO_MANY_INFOS_PER_ITERATION",
            Self::NormalEnd => "NORMAL_END",
            Self::SameErrorLastIteration => "SAME_ERROR_LAST_ITERATION",
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => Self::CreateHeader,
            1 => Self::IterationTime,
            2 => Self::ErrorDetail,
            3 => Self::InfoDetail,
            4 => Self::SdcEnd,
            5 => Self::TooManyErrorsPerIteration,
            6 => Self::TooManyInfosPerIteration,
            7 => Self::NormalEnd,
            8 => Self::SameErrorLastIteration,
            other => return Err(ProtocolError::UnknownMessageType(other)),
        })
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single telemetry message: tag plus an explicitly sized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    message_type: MessageType,
    payload: Vec<u8>,
    truncated: bool,
}

impl Frame {
    /// Build a frame, truncating the payload to [`MAX_PAYLOAD`] bytes.
    pub fn new(message_type: MessageType, payload: &[u8]) -> Self {
        let truncated = payload.len() > MAX_PAYLOAD;
        let len = payload.len().min(MAX_PAYLOAD);
        Self {
            message_type,
            payload: payload[..len].to_vec(),
            truncated,
        }
    }

    /// Build a frame from text, truncating on a UTF-8 character boundary.
    pub fn text(message_type: MessageType, text: &str) -> Self {
        if text.len() <= MAX_PAYLOAD {
            return Self::new(message_type, text.as_bytes());
        }
        let mut cut = MAX_PAYLOAD;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        Self {
            message_type,
            payload: text.as_bytes()[..cut].to_vec(),
            truncated: true,
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload as text, replacing invalid UTF-8 sequences.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Encode into a fresh zero-padded wire buffer.
    pub fn encode(&self) -> [u8; FRAME_SIZE] {
        let mut buf = [0u8; FRAME_SIZE];
        buf[0] = self.message_type.tag();
        buf[1..1 + self.payload.len()].copy_from_slice(&self.payload);
        buf
    }

    /// Decode a wire buffer. Trailing zero padding is stripped.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (&tag, rest) = bytes.split_first().ok_or(ProtocolError::EmptyFrame)?;
        let message_type = MessageType::try_from(tag)?;
        let end = rest.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        Ok(Self::new(message_type, &rest[..end]))
    }
}

/// Decoded `CREATE_HEADER` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPayload {
    pub benchmark_name: String,
    pub test_info: String,
}

impl HeaderPayload {
    pub fn encode(benchmark_name: &str, test_info: &str) -> Result<Vec<u8>, ProtocolError> {
        let len = benchmark_name.len();
        if len > MAX_BENCHMARK_NAME {
            return Err(ProtocolError::NameTooLong {
                len,
                max: MAX_BENCHMARK_NAME,
            });
        }
        let mut buf = Vec::with_capacity(1 + len + test_info.len());
        buf.push(len as u8);
        buf.extend_from_slice(benchmark_name.as_bytes());
        buf.extend_from_slice(test_info.as_bytes());
        Ok(buf)
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let (&declared, rest) = payload.split_first().ok_or(ProtocolError::EmptyFrame)?;
        let declared = declared as usize;
        if rest.len() < declared {
            return Err(ProtocolError::HeaderTruncated {
                declared,
                available: rest.len(),
            });
        }
        let (name, info) = rest.split_at(declared);
        Ok(Self {
            benchmark_name: String::from_utf8_lossy(name).into_owned(),
            test_info: String::from_utf8_lossy(info).into_owned(),
        })
    }
}
