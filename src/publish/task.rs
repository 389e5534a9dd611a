use serde::Serialize;

/// State of a deferred publish task. `Cancelled` and `Committed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommitState {
    /// Counting down; cancellation still possible
    Pending,
    /// Cancelled before the countdown reached zero
    Cancelled,
    /// Countdown reached zero; the resource is published
    Committed,
}

impl CommitState {
    pub fn name(&self) -> &'static str {
        match self {
            CommitState::Pending => "pending",
            CommitState::Cancelled => "cancelled",
            CommitState::Committed => "committed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CommitState::Pending)
    }
}

/// One publish countdown: created after a successful upload, destroyed on
/// commit or cancel. `remaining_seconds` only ever decreases; ticks against a
/// terminal task are ignored.
#[derive(Debug, Clone, Serialize)]
pub struct CommitTask {
    pub id: String,
    pub resource_id: String,
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub state: CommitState,
}

impl CommitTask {
    pub fn new(resource_id: impl Into<String>, total_seconds: u32) -> Self {
        Self {
            id: format!("commit-{}", uuid::Uuid::new_v4()),
            resource_id: resource_id.into(),
            total_seconds,
            remaining_seconds: total_seconds,
            state: CommitState::Pending,
        }
    }

    /// Apply one countdown tick.
    ///
    /// Pure transition: decrements while Pending and commits at zero.
    /// Terminal states absorb ticks unchanged.
    pub fn tick(&mut self) -> CommitState {
        if self.state != CommitState::Pending {
            return self.state;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.state = CommitState::Committed;
        }
        self.state
    }
}
