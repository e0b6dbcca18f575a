//! What happens to the process once a run is declared compromised.

use crate::policy::KillReason;

/// Exit code used by [`ProcessExit`].
pub const KILL_EXIT_CODE: i32 = 1;

/// Called after the abort message is sent and the local log is flushed.
pub trait Terminator: Send {
    fn terminate(&self, reason: &KillReason);
}

/// Exit the process. The default for real runs.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExit {
    pub code: i32,
}

impl Default for ProcessExit {
    fn default() -> Self {
        Self {
            code: KILL_EXIT_CODE,
        }
    }
}

impl Terminator for ProcessExit {
    fn terminate(&self, reason: &KillReason) {
        tracing::error!(%reason, code = self.code, "terminating process");
        std::process::exit(self.code);
    }
}

/// Leave the process running; the killing call returns
/// [`SessionError::ThresholdExceeded`](super::SessionError::ThresholdExceeded)
/// and the session stays in `KilledFatal`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOnly;

impl Terminator for ReportOnly {
    fn terminate(&self, _reason: &KillReason) {}
}
