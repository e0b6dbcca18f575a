//! Iteration telemetry for long-running benchmark kernels.
//!
//! Records timing and error/observation counts per kernel iteration during
//! radiation and fault-injection experiments, and ships them to a remote
//! collector without letting the network dictate the kernel's timing.
//!
//! # Layout
//!
//! - [`config`]: `key=value` configuration file and derived settings
//! - [`transport`]: wire format and the datagram/synchronous strategies
//! - [`policy`]: error/info caps and the double-error kill rule
//! - [`sink`]: local append-only audit log
//! - [`session`]: the per-run state machine tying them together
//! - [`telemetry`]: tracing and metrics for the library itself
//!
//! # Example
//!
//! ```no_run
//! use radbench_log::IterationSession;
//!
//! let mut session = IterationSession::start("matmul", "n=1024")?;
//! for _ in 0..10 {
//!     session.begin_iteration()?;
//!     // run the kernel
//!     session.end_iteration()?;
//!     session.report_error_count(0)?;
//! }
//! session.end()?;
//! # Ok::<(), radbench_log::SessionError>(())
//! ```

pub mod config;
pub mod policy;
pub mod session;
pub mod sink;
pub mod telemetry;
pub mod transport;

pub use config::{ConfigError, ConfigStore, SessionOptions, TelemetrySettings};
pub use policy::{KillReason, ThresholdPolicy};
pub use session::{
    IterationSession, ProcessExit, ReportOnly, SessionBuilder, SessionError, SessionState,
    Terminator, KILL_EXIT_CODE,
};
pub use transport::{MessageType, Transport, TransportError, TransportKind};
