use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use super::state::LiveSessionState;
use crate::audio::AudioHardwareSession;
use crate::error::LiveSessionError;
use crate::journal::{EventJournal, EventLogEntry};
use crate::negotiation::{EndMetadata, Role, SessionDescriptor, SessionNegotiator, StartParams};
use crate::transport::{
    ConnectionState, MediaTransport, TransportConnection, TransportEvent,
};

/// How a session grant is obtained: create a new session as host, or join an
/// existing one.
enum Negotiation {
    Create(StartParams),
    Join { session_id: String, role: Role },
}

impl Negotiation {
    fn describe(&self) -> String {
        match self {
            Negotiation::Create(params) => {
                format!("create (title={:?})", params.title)
            }
            Negotiation::Join { session_id, role } => {
                format!("join {} as {}", session_id, role.as_str())
            }
        }
    }
}

/// Lifecycle state guarded by a sync mutex, never held across an await.
struct Lifecycle {
    state: LiveSessionState,
    generation: u64,
    session: Option<SessionDescriptor>,
}

/// Top-level orchestrator for one host-or-listener live session.
///
/// Composes the session negotiator, the transport connection, the exclusive
/// audio session and the event journal. Handlers for the same controller
/// interleave only at suspension points (the negotiator and transport calls);
/// every resumption after an await re-checks the generation counter so a
/// result that arrives after the controller has moved on is discarded and
/// journaled instead of being applied to current state.
pub struct LiveSessionController {
    /// Holder id used for the exclusive audio session
    id: String,

    negotiator: Arc<dyn SessionNegotiator>,

    /// Transport FSM; locked across connect/disconnect suspension points
    connection: Mutex<TransportConnection>,

    /// Shared device audio resource
    audio: Arc<Mutex<AudioHardwareSession>>,

    /// Lifecycle event log
    journal: Arc<EventJournal>,

    /// State + generation counter; sync lock, released before every await
    lifecycle: StdMutex<Lifecycle>,

    /// Event receiver from the current transport connection, held until the
    /// caller takes it for delivery
    events: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
}

impl LiveSessionController {
    pub fn new(
        negotiator: Arc<dyn SessionNegotiator>,
        transport: Box<dyn MediaTransport>,
        audio: Arc<Mutex<AudioHardwareSession>>,
    ) -> Self {
        Self {
            id: format!("live-session-{}", uuid::Uuid::new_v4()),
            negotiator,
            connection: Mutex::new(TransportConnection::new(transport)),
            audio,
            journal: Arc::new(EventJournal::default()),
            lifecycle: StdMutex::new(Lifecycle {
                state: LiveSessionState::Idle,
                generation: 0,
                session: None,
            }),
            events: Mutex::new(None),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle operations
    // ------------------------------------------------------------------

    /// Start a new session as host.
    ///
    /// Idle/Ended/Failed only. Negotiates a credential, connects the
    /// transport, then acquires the audio session; a failure at any step rolls
    /// back whatever was taken and returns the controller to Idle.
    pub async fn start(&self, params: StartParams) -> Result<SessionDescriptor, LiveSessionError> {
        self.run_start(Negotiation::Create(params)).await
    }

    /// Join an existing session.
    ///
    /// Same lifecycle as [`start`](Self::start) but negotiates against the
    /// existing session instead of creating one.
    pub async fn join(
        &self,
        session_id: &str,
        role: Role,
    ) -> Result<SessionDescriptor, LiveSessionError> {
        self.run_start(Negotiation::Join {
            session_id: session_id.to_string(),
            role,
        })
        .await
    }

    async fn run_start(&self, kind: Negotiation) -> Result<SessionDescriptor, LiveSessionError> {
        // Claim the lifecycle and tag this attempt with a fresh generation.
        let generation = {
            let mut lifecycle = self.lock_lifecycle();
            if !lifecycle.state.can_start() {
                return Err(LiveSessionError::InvalidTransition {
                    state: lifecycle.state.name().to_string(),
                    action: "start".to_string(),
                });
            }
            lifecycle.state = LiveSessionState::Starting;
            lifecycle.generation += 1;
            lifecycle.generation
        };

        self.journal
            .append(format!("session start requested: {}", kind.describe()));

        {
            let mut connection = self.connection.lock().await;
            if let Err(e) = connection.begin_request() {
                // Lifecycle allowed a start but the connection FSM disagrees:
                // a previous teardown did not complete. Fail loudly.
                self.reset_to_idle_if_current(generation);
                return Err(e);
            }
        }

        // Suspension point: single network attempt, no retry, no timeout.
        let grant = match &kind {
            Negotiation::Create(params) => self.negotiator.create_session(params).await,
            Negotiation::Join { session_id, role } => {
                self.negotiator.join_session(session_id, *role).await
            }
        };

        let grant = match grant {
            Ok(grant) => grant,
            Err(e) => {
                if !self.is_current(generation) {
                    return self.discard_stale("credential failure");
                }
                self.journal
                    .append(format!("credential request failed: {}", e));
                self.connection.lock().await.abort_request();
                self.reset_to_idle_if_current(generation);
                return Err(LiveSessionError::CredentialRequest(e));
            }
        };

        if !self.is_current(generation) {
            return self.discard_stale("credential response");
        }

        self.journal.append(format!(
            "credential acquired (session={}, role={})",
            grant.credential.session_id,
            grant.credential.role.as_str()
        ));

        // Suspension point: transport connect.
        let events = {
            let mut connection = self.connection.lock().await;
            connection.connect(grant.credential.clone()).await
        };

        let events = match events {
            Ok(events) => events,
            Err(e) => {
                if !self.is_current(generation) {
                    return self.discard_stale("transport connect failure");
                }
                self.journal
                    .append(format!("transport connect failed: {}", e));
                self.reset_to_idle_if_current(generation);
                return Err(e);
            }
        };

        if !self.is_current(generation) {
            // The connection completed after the controller moved on; undo it.
            self.connection.lock().await.disconnect().await;
            return self.discard_stale("transport connection");
        }

        self.journal.append("transport connected");

        // Acquire the exclusive device audio resource.
        {
            let mut audio = self.audio.lock().await;
            if let Err(e) = audio.acquire(&self.id) {
                self.journal
                    .append(format!("audio route activation failed: {}", e));
                self.connection.lock().await.disconnect().await;
                self.reset_to_idle_if_current(generation);
                return Err(LiveSessionError::AudioRoute(e));
            }
        }
        self.journal.append("audio session acquired");

        // Commit: the session is live.
        let stale = {
            let mut lifecycle = self.lock_lifecycle();
            if lifecycle.generation == generation {
                lifecycle.state = LiveSessionState::Active;
                lifecycle.session = Some(grant.session.clone());
                false
            } else {
                true
            }
        };

        if stale {
            // Superseded between audio acquisition and commit; release both.
            self.connection.lock().await.disconnect().await;
            self.audio.lock().await.release(&self.id);
            return self.discard_stale("session activation");
        }

        self.journal.append(format!(
            "session active (id={}, room={})",
            grant.session.id, grant.session.room
        ));
        info!("Live session {} active", grant.session.id);

        *self.events.lock().await = Some(events);

        Ok(grant.session)
    }

    /// End the session: disconnect the transport, release the audio session,
    /// post end-of-session metadata, transition to Ended.
    ///
    /// No-op on an Idle or already-Ended controller. Calling during Starting
    /// cancels the in-flight start: the generation bump makes its resumption
    /// discard itself. Local teardown always completes; a finalize failure is
    /// journaled and returned afterwards.
    pub async fn end(&self, metadata: EndMetadata) -> Result<(), LiveSessionError> {
        let session_id = {
            let mut lifecycle = self.lock_lifecycle();
            match lifecycle.state {
                LiveSessionState::Idle | LiveSessionState::Ended => return Ok(()),
                _ => {}
            }
            lifecycle.state = LiveSessionState::Ending;
            lifecycle.generation += 1;
            lifecycle.session.as_ref().map(|s| s.id.clone())
        };

        self.journal.append("session ending");

        // Drop the event receiver first so late engine events from this
        // connection go nowhere instead of racing the teardown.
        *self.events.lock().await = None;

        {
            let mut connection = self.connection.lock().await;
            if connection.disconnect().await.is_some() {
                self.journal.append("transport disconnected");
            }
            // A start cancelled mid-negotiation leaves the FSM in Requesting;
            // the generation bump already made its resumption inert.
            connection.abort_request();
        }

        {
            let mut audio = self.audio.lock().await;
            if audio.holder() == Some(self.id.as_str()) {
                audio.release(&self.id);
                self.journal.append("audio session released");
            }
        }

        // Suspension point: single finalize attempt against the service.
        let finalize_result = match &session_id {
            Some(id) => match self.negotiator.finalize(id, &metadata).await {
                Ok(ack) => {
                    self.journal
                        .append(format!("session finalized (status={})", ack.status));
                    Ok(())
                }
                Err(e) => {
                    self.journal.append(format!("session finalize failed: {}", e));
                    Err(LiveSessionError::Finalize(e))
                }
            },
            // The start never completed; there is nothing to finalize.
            None => Ok(()),
        };

        {
            let mut lifecycle = self.lock_lifecycle();
            lifecycle.state = LiveSessionState::Ended;
            lifecycle.session = None;
        }
        self.journal.append("session ended");

        finalize_result
    }

    /// Toggle the local microphone. Valid only while Active.
    pub async fn toggle_microphone(&self, enabled: bool) -> Result<(), LiveSessionError> {
        {
            let lifecycle = self.lock_lifecycle();
            if !lifecycle.state.is_active() {
                return Err(LiveSessionError::InvalidTransition {
                    state: lifecycle.state.name().to_string(),
                    action: "toggle microphone".to_string(),
                });
            }
        }

        let result = self.connection.lock().await.set_microphone(enabled).await;
        match &result {
            Ok(()) => {
                self.journal.append(format!(
                    "microphone {}",
                    if enabled { "enabled" } else { "muted" }
                ));
            }
            Err(e) => {
                self.journal
                    .append(format!("microphone toggle rejected: {}", e));
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // Transport events
    // ------------------------------------------------------------------

    /// Apply one engine event to the session.
    ///
    /// Recoverable drops move Active -> Reconnecting and back without touching
    /// the audio session; an unexpected terminal disconnect fails the session
    /// and releases the device.
    pub async fn handle_transport_event(
        &self,
        event: TransportEvent,
    ) -> Result<(), LiveSessionError> {
        let edge = self.connection.lock().await.apply_event(&event);

        let Some(edge) = edge else {
            return Ok(());
        };

        match edge.to {
            ConnectionState::Reconnecting => {
                let mut lifecycle = self.lock_lifecycle();
                if lifecycle.state == LiveSessionState::Active {
                    lifecycle.state = LiveSessionState::Reconnecting;
                }
                drop(lifecycle);
                // Audio stays held across transport hiccups so device routing
                // does not glitch audibly.
                self.journal.append("transport connection lost; reconnecting");
                Ok(())
            }
            ConnectionState::Connected => {
                let mut lifecycle = self.lock_lifecycle();
                if lifecycle.state == LiveSessionState::Reconnecting {
                    lifecycle.state = LiveSessionState::Active;
                }
                drop(lifecycle);
                self.journal.append("transport reconnected");
                Ok(())
            }
            ConnectionState::Disconnected => {
                let reason = match &event {
                    TransportEvent::Disconnected { reason: Some(r) } => r.clone(),
                    _ => "connection closed".to_string(),
                };

                let unexpected = {
                    let mut lifecycle = self.lock_lifecycle();
                    match lifecycle.state {
                        LiveSessionState::Active
                        | LiveSessionState::Reconnecting
                        | LiveSessionState::Starting => {
                            lifecycle.state = LiveSessionState::Failed;
                            lifecycle.generation += 1;
                            lifecycle.session = None;
                            true
                        }
                        _ => false,
                    }
                };

                if unexpected {
                    self.audio.lock().await.release(&self.id);
                    self.journal.append(format!(
                        "transport disconnected unexpectedly: {}",
                        reason
                    ));
                    warn!("Live session failed: {}", reason);
                    Err(LiveSessionError::DisconnectedUnexpectedly { reason })
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Take the event receiver of the current connection.
    ///
    /// The caller owns delivery: feed each event to
    /// [`handle_transport_event`](Self::handle_transport_event), or hand the
    /// receiver to [`run_event_loop`](Self::run_event_loop). Returns `None`
    /// when no connection is live or the receiver was already taken.
    pub async fn take_event_receiver(&self) -> Option<mpsc::Receiver<TransportEvent>> {
        self.events.lock().await.take()
    }

    /// Drain a transport event receiver until it closes, applying each event.
    ///
    /// Convenience wrapper for callers that dedicate a task to event delivery;
    /// errors are journaled by `handle_transport_event` and logged here.
    pub async fn run_event_loop(&self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle_transport_event(event).await {
                warn!("Transport event ended session: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> LiveSessionState {
        self.lock_lifecycle().state
    }

    /// The locally cached session record, if a session is live
    pub fn current_session(&self) -> Option<SessionDescriptor> {
        self.lock_lifecycle().session.clone()
    }

    /// Snapshot of the lifecycle journal, oldest first
    pub fn journal_entries(&self) -> Vec<EventLogEntry> {
        self.journal.snapshot()
    }

    pub async fn microphone_enabled(&self) -> bool {
        self.connection.lock().await.local_audio().mic_enabled
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.connection.lock().await.state()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock_lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().expect("lifecycle lock poisoned")
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_lifecycle().generation == generation
    }

    fn reset_to_idle_if_current(&self, generation: u64) {
        let mut lifecycle = self.lock_lifecycle();
        if lifecycle.generation == generation {
            lifecycle.state = LiveSessionState::Idle;
        }
    }

    fn discard_stale(&self, what: &str) -> Result<SessionDescriptor, LiveSessionError> {
        self.journal
            .append(format!("stale {} discarded (controller moved on)", what));
        Err(LiveSessionError::Superseded)
    }
}
