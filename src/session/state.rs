use serde::Serialize;

/// Lifecycle of a live session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LiveSessionState {
    /// No session; ready to start or join
    Idle,
    /// Negotiating a credential and connecting
    Starting,
    /// Connected and live
    Active,
    /// Transport dropped; engine is recovering, audio stays held
    Reconnecting,
    /// Teardown in progress
    Ending,
    /// Session ended cleanly
    Ended,
    /// Unrecoverable failure; audio released
    Failed,
}

impl LiveSessionState {
    pub fn name(&self) -> &'static str {
        match self {
            LiveSessionState::Idle => "idle",
            LiveSessionState::Starting => "starting",
            LiveSessionState::Active => "active",
            LiveSessionState::Reconnecting => "reconnecting",
            LiveSessionState::Ending => "ending",
            LiveSessionState::Ended => "ended",
            LiveSessionState::Failed => "failed",
        }
    }

    /// States from which a new start/join may begin
    pub fn can_start(&self) -> bool {
        matches!(
            self,
            LiveSessionState::Idle | LiveSessionState::Ended | LiveSessionState::Failed
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LiveSessionState::Active)
    }
}
