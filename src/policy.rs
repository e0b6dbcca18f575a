//! Threshold policy: decides when a run is compromised.
//!
//! The policy only decides. Sending the abort message and terminating the
//! process is the session's job.

use crate::config::SessionOptions;
use crate::transport::MessageType;

/// Why a session must be killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillReason {
    TooManyErrors { count: usize, max: usize },
    TooManyInfos { count: usize, max: usize },
    ErrorsInConsecutiveIterations { iteration: usize },
}

impl KillReason {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::TooManyErrors { .. } => MessageType::TooManyErrorsPerIteration,
            Self::TooManyInfos { .. } => MessageType::TooManyInfosPerIteration,
            Self::ErrorsInConsecutiveIterations { .. } => MessageType::SameErrorLastIteration,
        }
    }

    /// Abort marker written to the local log and sent as payload.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::TooManyErrors { .. } => "#ABORT: too many errors per iteration",
            Self::TooManyInfos { .. } => "#ABORT: too many infos per iteration",
            Self::ErrorsInConsecutiveIterations { .. } => {
                "#ABORT: errors in two consecutive iterations"
            }
        }
    }
}

impl std::fmt::Display for KillReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyErrors { count, max } => {
                write!(f, "{} errors in one iteration (max {})", count, max)
            }
            Self::TooManyInfos { count, max } => {
                write!(f, "{} infos in one iteration (max {})", count, max)
            }
            Self::ErrorsInConsecutiveIterations { iteration } => {
                write!(f, "errors reported again at iteration {}", iteration)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Kill(KillReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailVerdict {
    Emit,
    Drop,
}

/// Caps and the double-error memory for one run.
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    max_errors_per_iter: usize,
    max_infos_per_iter: usize,
    double_error_kill: bool,
    info_overflow_fatal: bool,
    last_iter_errors: usize,
    last_iter_with_errors: usize,
}

impl ThresholdPolicy {
    pub fn new(options: &SessionOptions) -> Self {
        Self {
            max_errors_per_iter: options.max_errors_per_iter,
            max_infos_per_iter: options.max_infos_per_iter,
            double_error_kill: options.double_error_kill,
            info_overflow_fatal: options.info_overflow_fatal,
            last_iter_errors: 0,
            last_iter_with_errors: 0,
        }
    }

    /// Evaluate an error count reported during `iteration`.
    ///
    /// Overflow is checked before the consecutive-iteration rule.
    pub fn check_errors(&mut self, kernel_errors: usize, iteration: usize) -> Verdict {
        if kernel_errors == 0 {
            return Verdict::Continue;
        }
        if kernel_errors > self.max_errors_per_iter {
            return Verdict::Kill(KillReason::TooManyErrors {
                count: kernel_errors,
                max: self.max_errors_per_iter,
            });
        }
        let previous_had_errors = self.last_iter_errors > 0
            && iteration.checked_sub(1) == Some(self.last_iter_with_errors);
        if self.double_error_kill && previous_had_errors {
            return Verdict::Kill(KillReason::ErrorsInConsecutiveIterations { iteration });
        }
        self.last_iter_errors = kernel_errors;
        self.last_iter_with_errors = iteration;
        Verdict::Continue
    }

    /// Evaluate an info count. Overflow only kills when configured fatal.
    pub fn check_infos(&self, info_count: usize) -> Verdict {
        if info_count > self.max_infos_per_iter && self.info_overflow_fatal {
            Verdict::Kill(KillReason::TooManyInfos {
                count: info_count,
                max: self.max_infos_per_iter,
            })
        } else {
            Verdict::Continue
        }
    }

    /// Whether a detail message may go out given `emitted` so far this iteration.
    pub fn error_detail(&self, emitted: usize) -> DetailVerdict {
        if emitted < self.max_errors_per_iter {
            DetailVerdict::Emit
        } else {
            DetailVerdict::Drop
        }
    }

    pub fn info_detail(&self, emitted: usize) -> DetailVerdict {
        if emitted < self.max_infos_per_iter {
            DetailVerdict::Emit
        } else {
            DetailVerdict::Drop
        }
    }

    pub fn max_errors_per_iter(&self) -> usize {
        self.max_errors_per_iter
    }

    pub fn set_max_errors_per_iter(&mut self, max: usize) {
        self.max_errors_per_iter = max;
    }

    pub fn max_infos_per_iter(&self) -> usize {
        self.max_infos_per_iter
    }

    pub fn set_max_infos_per_iter(&mut self, max: usize) {
        self.max_infos_per_iter = max;
    }

    pub fn info_overflow_fatal(&self) -> bool {
        self.info_overflow_fatal
    }

    pub fn set_info_overflow_fatal(&mut self, fatal: bool) {
        self.info_overflow_fatal = fatal;
    }

    pub fn double_error_kill(&self) -> bool {
        self.double_error_kill
    }

    /// Permanent for the rest of the run.
    pub fn disable_double_error_kill(&mut self) {
        self.double_error_kill = false;
    }
}
