use serde::Serialize;

/// Connection lifecycle of the media transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    /// No connection and none in progress
    Idle,
    /// A join credential is being requested from the coordination service
    Requesting,
    /// Connecting to the media transport with a credential
    Connecting,
    /// Live connection established
    Connected,
    /// Connection dropped, engine is attempting recovery
    Reconnecting,
    /// Cleanly disconnected
    Disconnected,
    /// Unrecoverable connection failure
    Failed,
}

impl ConnectionState {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Requesting => "requesting",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
        }
    }

    /// Typed transition table for the connection state machine.
    ///
    /// `Disconnected` and `Failed` permit starting over (a retry is always a
    /// whole new operation); `Connected` must pass through `Disconnected`
    /// before a new connection may begin.
    pub fn can_transition(self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        match self {
            Idle => matches!(next, Requesting | Connecting),
            Requesting => matches!(next, Connecting | Idle | Failed),
            Connecting => matches!(next, Connected | Failed | Idle | Disconnected),
            Connected => matches!(next, Reconnecting | Disconnected | Failed),
            Reconnecting => matches!(next, Connected | Disconnected | Failed),
            Disconnected => matches!(next, Requesting | Connecting | Idle),
            Failed => matches!(next, Requesting | Connecting | Idle),
        }
    }
}

/// A single observed state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionEdge {
    pub from: ConnectionState,
    pub to: ConnectionState,
}
