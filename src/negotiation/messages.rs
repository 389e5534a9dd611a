use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Role, SessionDescriptor};

/// Request body for creating a session as host
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Request body for joining an existing session
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    pub session_id: String,
    pub role: Role,
}

/// Response to both create and join: the session record plus transport
/// token and endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: SessionDescriptor,
    pub token: String,
    pub url: String,
}

/// Request body for ending a session
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
}

/// Response to an end-session call
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionResponse {
    pub status: String,
    pub ended_at: DateTime<Utc>,
}

/// Request body for cancelling a draft resource during its grace period
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelDraftRequest {
    pub resource_id: String,
}

/// Response to a draft cancellation
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelDraftResponse {
    pub status: String,
}
