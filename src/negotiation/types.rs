use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Participant role within a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Session owner: publishes audio, controls session lifetime
    Host,
    /// Audience member: receives audio only
    Listener,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Listener => "listener",
        }
    }
}

/// Opaque, role- and session-scoped authorization for one transport connection.
///
/// Consumed exactly once by the transport; requesting a different role
/// requires a new credential, never an in-place upgrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinCredential {
    /// Session this credential is scoped to
    pub session_id: String,

    /// Role the credential authorizes
    pub role: Role,

    /// Opaque transport token
    pub token: String,

    /// Media transport endpoint to connect to
    pub transport_url: String,

    /// When the coordination service issued the credential
    pub issued_at: DateTime<Utc>,
}

/// Authoritative session record owned by the coordination service.
///
/// Cached locally read-only while a controller is active, discarded on
/// teardown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub id: String,
    pub room: String,
    pub host_id: String,
    pub topic_id: Option<String>,
    pub title: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Combined negotiation result: the session record plus the credential that
/// authorizes connecting to it.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub session: SessionDescriptor,
    pub credential: JoinCredential,
}

/// Host-provided parameters for creating a session
#[derive(Debug, Clone, Default)]
pub struct StartParams {
    pub topic_id: Option<String>,
    pub title: Option<String>,
}

/// End-of-session metadata posted to the coordination service
#[derive(Debug, Clone, Default)]
pub struct EndMetadata {
    /// Storage key of the session recording, if one was produced
    pub recording_key: Option<String>,

    /// Total session duration in seconds
    pub duration_seconds: Option<u64>,
}

/// Acknowledgement of a finalize call
#[derive(Debug, Clone)]
pub struct FinalizeAck {
    pub status: String,
    pub ended_at: DateTime<Utc>,
}
