/// Run state definitions shared by workers and the session pause signal
///
/// This module defines the three control states and the reasons a worker can stop.
use std::fmt;

/// Represents the control state of a worker or of a whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Fetching pages
    Running,

    /// Suspended between pages until resumed or stopped
    Paused,

    /// Finished; terminal and irreversible
    Stopped,
}

impl WorkerState {
    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true while the worker may still fetch pages
    ///
    /// A paused worker is still active: it will continue once resumed.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Checks whether moving from `self` to `next` is allowed
    ///
    /// Running and Paused move freely between each other and into Stopped.
    /// Nothing leaves Stopped.
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        match (self, next) {
            (Self::Stopped, _) => false,
            (Self::Running, Self::Running) | (Self::Paused, Self::Paused) => false,
            _ => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a worker stopped paginating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The operator stopped the session, or the worker was stopped directly
    Operator,

    /// Too many consecutive empty or failed pages
    RetriesExhausted,

    /// A page contained only already-collected names; pagination has cycled
    NoNewRecords,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Operator => "stopped by operator",
            Self::RetriesExhausted => "empty page limit reached",
            Self::NoNewRecords => "no new properties on last page",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!WorkerState::Running.is_terminal());
        assert!(!WorkerState::Paused.is_terminal());
        assert!(WorkerState::Stopped.is_terminal());
    }

    #[test]
    fn test_paused_is_active() {
        assert!(WorkerState::Running.is_active());
        assert!(WorkerState::Paused.is_active());
        assert!(!WorkerState::Stopped.is_active());
    }

    #[test]
    fn test_transitions() {
        use WorkerState::*;

        assert!(Running.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Running));
        assert!(Running.can_transition_to(Stopped));
        assert!(Paused.can_transition_to(Stopped));

        assert!(!Running.can_transition_to(Running));
        assert!(!Paused.can_transition_to(Paused));

        // Nothing resurrects a stopped worker
        assert!(!Stopped.can_transition_to(Running));
        assert!(!Stopped.can_transition_to(Paused));
        assert!(!Stopped.can_transition_to(Stopped));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", WorkerState::Paused), "paused");
        assert_eq!(
            format!("{}", StopReason::NoNewRecords),
            "no new properties on last page"
        );
    }
}
