//! Ambient observability for the telemetry library itself.
//!
//! Structured logging, session spans and `metrics` counters. None of this is
//! part of the collector wire protocol.

mod logging;
pub mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::init_metrics;
pub use spans::{SessionSpan, SpanExt};
