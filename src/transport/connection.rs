use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::{ConnectionEdge, ConnectionState};
use crate::error::LiveSessionError;
use crate::negotiation::JoinCredential;

/// Events emitted by the media engine after a connection is established.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Connection established (also emitted by some engines after `connect`
    /// returns; deduplicated by the state machine)
    Connected,
    /// Connection dropped, engine is retrying internally
    ConnectionLost { reason: String },
    /// Engine recovered the dropped connection
    Reconnected,
    /// Connection closed for good. `reason` is present for remote/unexpected
    /// drops and absent for locally requested disconnects.
    Disconnected { reason: Option<String> },
    /// A remote participant's microphone state changed
    ParticipantMicrophoneChanged { participant_id: String, enabled: bool },
}

/// Microphone flag for one participant.
///
/// The local participant's flag is mutated only through
/// [`TransportConnection::set_microphone`]; remote participants' flags are
/// mirrored from engine events and never locally owned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantAudioState {
    pub mic_enabled: bool,
}

/// Media engine boundary.
///
/// Implemented over the actual RTC engine in the surrounding application and
/// by fakes in tests. `connect` returns the receiver on which the engine
/// delivers its connection and participant events.
#[async_trait::async_trait]
pub trait MediaTransport: Send + Sync {
    /// Connect using a join credential
    ///
    /// Returns a channel receiver that will receive transport events
    async fn connect(&mut self, credential: &JoinCredential) -> Result<mpsc::Receiver<TransportEvent>>;

    /// Tear down the connection
    async fn disconnect(&mut self) -> Result<()>;

    /// Publish or mute the local participant's microphone
    async fn set_microphone(&mut self, enabled: bool) -> Result<()>;

    /// Get engine name for logging
    fn name(&self) -> &str;
}

/// Connection state machine over a media engine.
///
/// Owns the [`ConnectionState`] FSM, the local participant's audio state and
/// the mirrored remote participant map. All observed edges are exactly-once:
/// repeated engine events and repeated `disconnect` calls collapse into a
/// single transition.
pub struct TransportConnection {
    transport: Box<dyn MediaTransport>,
    state: ConnectionState,
    local_audio: ParticipantAudioState,
    remote_audio: HashMap<String, ParticipantAudioState>,
}

impl TransportConnection {
    pub fn new(transport: Box<dyn MediaTransport>) -> Self {
        Self {
            transport,
            state: ConnectionState::Idle,
            local_audio: ParticipantAudioState::default(),
            remote_audio: HashMap::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn local_audio(&self) -> ParticipantAudioState {
        self.local_audio
    }

    /// Mirrored remote participant audio states
    pub fn remote_participants(&self) -> &HashMap<String, ParticipantAudioState> {
        &self.remote_audio
    }

    /// Enter `Requesting` while a credential is negotiated.
    pub fn begin_request(&mut self) -> Result<(), LiveSessionError> {
        self.transition_to(ConnectionState::Requesting)
            .map(|_| ())
    }

    /// Abort a credential request that failed, back to `Idle`.
    pub fn abort_request(&mut self) {
        if self.state == ConnectionState::Requesting {
            let _ = self.transition_to(ConnectionState::Idle);
        }
    }

    /// Connect to the media transport, consuming the credential.
    ///
    /// Suspends until the engine reports success or failure. On success the
    /// engine's event receiver is returned for the caller to drain.
    pub async fn connect(
        &mut self,
        credential: JoinCredential,
    ) -> Result<mpsc::Receiver<TransportEvent>, LiveSessionError> {
        self.transition_to(ConnectionState::Connecting)?;

        info!(
            "Connecting to {} at {} (session={}, role={})",
            self.transport.name(),
            credential.transport_url,
            credential.session_id,
            credential.role.as_str()
        );

        match self.transport.connect(&credential).await {
            Ok(events) => {
                let _ = self.transition_to(ConnectionState::Connected);
                self.local_audio = ParticipantAudioState::default();
                self.remote_audio.clear();
                info!("Transport connected (session={})", credential.session_id);
                Ok(events)
            }
            Err(e) => {
                let _ = self.transition_to(ConnectionState::Failed);
                Err(LiveSessionError::TransportConnect(e))
            }
        }
    }

    /// Disconnect from the media transport.
    ///
    /// Idempotent: when no connection exists this is a no-op and produces no
    /// second `Disconnected` edge. Engine errors during teardown are logged,
    /// not surfaced; the local state machine always reaches `Disconnected`.
    pub async fn disconnect(&mut self) -> Option<ConnectionEdge> {
        if !self
            .state
            .can_transition(ConnectionState::Disconnected)
        {
            return None;
        }

        if let Err(e) = self.transport.disconnect().await {
            warn!("Transport disconnect reported error: {}", e);
        }

        let edge = self.transition_to(ConnectionState::Disconnected).ok();
        if edge.is_some() {
            info!("Transport disconnected");
        }
        edge
    }

    /// Toggle the local participant's microphone.
    ///
    /// Valid only while `Connected`. The flag is set optimistically and rolled
    /// back if the engine rejects the change, so a failed toggle leaves no
    /// partial state visible to the caller.
    pub async fn set_microphone(&mut self, enabled: bool) -> Result<(), LiveSessionError> {
        if self.state != ConnectionState::Connected {
            return Err(LiveSessionError::InvalidTransition {
                state: self.state.name().to_string(),
                action: "set microphone".to_string(),
            });
        }

        let previous = self.local_audio.mic_enabled;
        if previous == enabled {
            return Ok(());
        }

        self.local_audio.mic_enabled = enabled;

        match self.transport.set_microphone(enabled).await {
            Ok(()) => {
                info!("Local microphone {}", if enabled { "enabled" } else { "muted" });
                Ok(())
            }
            Err(e) => {
                self.local_audio.mic_enabled = previous;
                warn!("Microphone toggle rejected by transport: {}", e);
                Err(LiveSessionError::MicToggleRejected(e))
            }
        }
    }

    /// Apply one engine event to the state machine.
    ///
    /// Returns the resulting edge, or `None` when the event does not change
    /// state (duplicate engine callbacks, participant updates, stale noise).
    pub fn apply_event(&mut self, event: &TransportEvent) -> Option<ConnectionEdge> {
        match event {
            TransportEvent::Connected => self.apply_transition(ConnectionState::Connected),
            TransportEvent::ConnectionLost { reason } => {
                let edge = self.apply_transition(ConnectionState::Reconnecting);
                if edge.is_some() {
                    warn!("Transport connection lost ({}), reconnecting", reason);
                }
                edge
            }
            TransportEvent::Reconnected => self.apply_transition(ConnectionState::Connected),
            TransportEvent::Disconnected { reason } => {
                let edge = self.apply_transition(ConnectionState::Disconnected);
                if let (Some(_), Some(reason)) = (edge, reason) {
                    warn!("Transport disconnected by remote: {}", reason);
                }
                edge
            }
            TransportEvent::ParticipantMicrophoneChanged {
                participant_id,
                enabled,
            } => {
                self.remote_audio
                    .insert(participant_id.clone(), ParticipantAudioState { mic_enabled: *enabled });
                debug!("Participant {} microphone now {}", participant_id, enabled);
                None
            }
        }
    }

    /// Transition for engine-driven events: invalid transitions are stale
    /// noise and are dropped, duplicates collapse to `None`.
    fn apply_transition(&mut self, next: ConnectionState) -> Option<ConnectionEdge> {
        if self.state == next {
            return None;
        }
        match self.transition_to(next) {
            Ok(edge) => Some(edge),
            Err(_) => {
                debug!(
                    "Ignoring transport event: no {} -> {} transition",
                    self.state.name(),
                    next.name()
                );
                None
            }
        }
    }

    fn transition_to(&mut self, next: ConnectionState) -> Result<ConnectionEdge, LiveSessionError> {
        if !self.state.can_transition(next) {
            return Err(LiveSessionError::InvalidTransition {
                state: self.state.name().to_string(),
                action: format!("transition to {}", next.name()),
            });
        }

        let edge = ConnectionEdge {
            from: self.state,
            to: next,
        };
        debug!("Connection state: {} -> {}", edge.from.name(), edge.to.name());
        self.state = next;
        Ok(edge)
    }
}
