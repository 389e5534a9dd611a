// Shared fakes for the integration tests: coordination service, media
// engine, audio route and countdown clock, all controllable from the test
// body through handles.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use tokio::sync::{mpsc, Mutex};

use livecast::{
    AudioRoute, DraftService, EndMetadata, FinalizeAck, JoinCredential, MediaTransport, Role,
    SessionDescriptor, SessionGrant, SessionNegotiator, StartParams, Ticker, TransportEvent,
};

// ============================================================================
// Coordination service fake
// ============================================================================

#[derive(Default)]
pub struct FakeNegotiator {
    pub fail_create: AtomicBool,
    pub fail_join: AtomicBool,
    pub fail_finalize: AtomicBool,

    pub create_calls: AtomicUsize,
    pub join_calls: StdMutex<Vec<(String, Role)>>,
    pub finalize_calls: StdMutex<Vec<(String, EndMetadata)>>,

    /// When set, create/join block until the test sends a permit, so tests
    /// can interleave other handlers while negotiation is suspended.
    gate: Mutex<Option<mpsc::Receiver<()>>>,

    /// Set once a gated create/join has started waiting
    pub negotiation_started: AtomicBool,
}

impl FakeNegotiator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Gate negotiation on a permit channel; returns the sender.
    pub async fn gated() -> (Arc<Self>, mpsc::Sender<()>) {
        let negotiator = Self::new();
        let (tx, rx) = mpsc::channel(4);
        *negotiator.gate.lock().await = Some(rx);
        (negotiator, tx)
    }

    async fn pass_gate(&self) {
        self.negotiation_started.store(true, Ordering::SeqCst);
        let mut gate = self.gate.lock().await;
        if let Some(rx) = gate.as_mut() {
            let _ = rx.recv().await;
        }
    }

    fn grant(session_id: &str, role: Role, params: Option<&StartParams>) -> SessionGrant {
        let now = Utc::now();
        SessionGrant {
            session: SessionDescriptor {
                id: session_id.to_string(),
                room: format!("room-{}", session_id),
                host_id: "host-1".to_string(),
                topic_id: params.and_then(|p| p.topic_id.clone()),
                title: params.and_then(|p| p.title.clone()),
                started_at: now,
                ended_at: None,
            },
            credential: JoinCredential {
                session_id: session_id.to_string(),
                role,
                token: format!("token-{}", session_id),
                transport_url: "wss://transport.test".to_string(),
                issued_at: now,
            },
        }
    }
}

#[async_trait::async_trait]
impl SessionNegotiator for FakeNegotiator {
    async fn create_session(&self, params: &StartParams) -> Result<SessionGrant> {
        self.pass_gate().await;
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_create.load(Ordering::SeqCst) {
            bail!("service unavailable");
        }
        Ok(Self::grant("sess-1", Role::Host, Some(params)))
    }

    async fn join_session(&self, session_id: &str, role: Role) -> Result<SessionGrant> {
        self.pass_gate().await;
        self.join_calls
            .lock()
            .unwrap()
            .push((session_id.to_string(), role));

        if self.fail_join.load(Ordering::SeqCst) {
            bail!("session not found");
        }
        Ok(Self::grant(session_id, role, None))
    }

    async fn finalize(&self, session_id: &str, metadata: &EndMetadata) -> Result<FinalizeAck> {
        self.finalize_calls
            .lock()
            .unwrap()
            .push((session_id.to_string(), metadata.clone()));

        if self.fail_finalize.load(Ordering::SeqCst) {
            bail!("finalize rejected");
        }
        Ok(FinalizeAck {
            status: "ended".to_string(),
            ended_at: Utc::now(),
        })
    }
}

// ============================================================================
// Media engine fake
// ============================================================================

#[derive(Default)]
pub struct FakeTransportState {
    pub fail_connect: AtomicBool,
    pub reject_mic: AtomicBool,

    pub connect_calls: StdMutex<Vec<JoinCredential>>,
    pub disconnect_calls: AtomicUsize,
    pub mic_calls: StdMutex<Vec<bool>>,

    events_tx: StdMutex<Option<mpsc::Sender<TransportEvent>>>,
}

pub struct FakeTransport {
    state: Arc<FakeTransportState>,
}

/// Test-side handle to the fake engine: flip failure modes, inspect calls,
/// emit events as if the engine produced them.
#[derive(Clone)]
pub struct FakeTransportHandle {
    state: Arc<FakeTransportState>,
}

pub fn fake_transport() -> (Box<dyn MediaTransport>, FakeTransportHandle) {
    let state = Arc::new(FakeTransportState::default());
    (
        Box::new(FakeTransport {
            state: Arc::clone(&state),
        }),
        FakeTransportHandle { state },
    )
}

impl FakeTransportHandle {
    pub fn fail_connect(&self) {
        self.state.fail_connect.store(true, Ordering::SeqCst);
    }

    pub fn reject_mic(&self, reject: bool) {
        self.state.reject_mic.store(reject, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> usize {
        self.state.connect_calls.lock().unwrap().len()
    }

    pub fn disconnect_count(&self) -> usize {
        self.state.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn mic_calls(&self) -> Vec<bool> {
        self.state.mic_calls.lock().unwrap().clone()
    }

    pub fn connected_credentials(&self) -> Vec<JoinCredential> {
        self.state.connect_calls.lock().unwrap().clone()
    }

    /// Emit an engine event on the current connection's channel
    pub async fn emit(&self, event: TransportEvent) {
        let tx = self
            .state
            .events_tx
            .lock()
            .unwrap()
            .clone()
            .expect("no live connection to emit on");
        tx.send(event).await.expect("event receiver dropped");
    }
}

#[async_trait::async_trait]
impl MediaTransport for FakeTransport {
    async fn connect(&mut self, credential: &JoinCredential) -> Result<mpsc::Receiver<TransportEvent>> {
        self.state
            .connect_calls
            .lock()
            .unwrap()
            .push(credential.clone());

        if self.state.fail_connect.load(Ordering::SeqCst) {
            bail!("transport unreachable");
        }

        let (tx, rx) = mpsc::channel(16);
        *self.state.events_tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.state.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.events_tx.lock().unwrap() = None;
        Ok(())
    }

    async fn set_microphone(&mut self, enabled: bool) -> Result<()> {
        if self.state.reject_mic.load(Ordering::SeqCst) {
            return Err(anyhow!("publish permission denied"));
        }
        self.state.mic_calls.lock().unwrap().push(enabled);
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Audio route fake
// ============================================================================

#[derive(Default)]
pub struct FakeRouteState {
    pub activations: AtomicUsize,
    pub deactivations: AtomicUsize,
    pub fail_activate: AtomicBool,
}

pub struct FakeRoute {
    state: Arc<FakeRouteState>,
}

pub fn fake_route() -> (Box<dyn AudioRoute>, Arc<FakeRouteState>) {
    let state = Arc::new(FakeRouteState::default());
    (
        Box::new(FakeRoute {
            state: Arc::clone(&state),
        }),
        state,
    )
}

impl AudioRoute for FakeRoute {
    fn activate(&mut self) -> Result<()> {
        if self.state.fail_activate.load(Ordering::SeqCst) {
            bail!("route busy");
        }
        self.state.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<()> {
        self.state.deactivations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Draft service fake
// ============================================================================

#[derive(Default)]
pub struct FakeDrafts {
    pub fail_cancel: AtomicBool,
    pub cancel_calls: StdMutex<Vec<String>>,
}

impl FakeDrafts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancel_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DraftService for FakeDrafts {
    async fn cancel_draft(&self, resource_id: &str) -> Result<()> {
        self.cancel_calls
            .lock()
            .unwrap()
            .push(resource_id.to_string());

        if self.fail_cancel.load(Ordering::SeqCst) {
            bail!("draft delete failed");
        }
        Ok(())
    }
}

// ============================================================================
// Countdown clock fake
// ============================================================================

/// Ticker driven by the test: each permit sent releases exactly one tick.
/// A closed channel parks the countdown forever instead of free-running.
pub struct ManualTicker {
    permits: Mutex<mpsc::Receiver<()>>,
}

pub fn manual_ticker() -> (Arc<ManualTicker>, mpsc::Sender<()>) {
    let (tx, rx) = mpsc::channel(64);
    (
        Arc::new(ManualTicker {
            permits: Mutex::new(rx),
        }),
        tx,
    )
}

#[async_trait::async_trait]
impl Ticker for ManualTicker {
    async fn wait(&self) {
        let mut permits = self.permits.lock().await;
        if permits.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Log output for debugging test runs; safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn credential(session_id: &str, role: Role) -> JoinCredential {
    JoinCredential {
        session_id: session_id.to_string(),
        role,
        token: format!("token-{}", session_id),
        transport_url: "wss://transport.test".to_string(),
        issued_at: Utc::now(),
    }
}

/// Poll until `predicate` holds, failing the test after ~2 seconds.
pub async fn wait_until(what: &str, mut predicate: impl FnMut() -> bool) {
    for _ in 0..200 {
        if predicate() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}
