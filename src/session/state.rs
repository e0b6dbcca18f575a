//! Session lifecycle states.

/// Lifecycle of an [`IterationSession`](super::IterationSession).
///
/// A [`SessionBuilder`](super::SessionBuilder) is the not-yet-started stage;
/// a built session begins in `Started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Started,
    IterationActive,
    IterationIdle,
    Ended,
    KilledFatal,
}

impl SessionState {
    /// Whether telemetry may still be sent.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Self::Started | Self::IterationActive | Self::IterationIdle
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::IterationActive => "iteration_active",
            Self::IterationIdle => "iteration_idle",
            Self::Ended => "ended",
            Self::KilledFatal => "killed_fatal",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
