//! Session negotiation with the coordination service
//!
//! This module provides the client-side contract for the remote coordination
//! service that owns live sessions:
//! - Role-scoped join credential issuance (create / join)
//! - End-of-session finalization (recording key, duration)
//! - Draft resource cancellation for the publish commit flow
//!
//! All calls are single attempts with no internal retry or timeout; retry is
//! a caller decision.

mod http;
mod messages;
mod types;

pub use http::HttpSessionService;
pub use messages::{
    CancelDraftRequest, CancelDraftResponse, CreateSessionRequest, EndSessionRequest,
    EndSessionResponse, JoinSessionRequest, SessionResponse,
};
pub use types::{
    EndMetadata, FinalizeAck, JoinCredential, Role, SessionDescriptor, SessionGrant, StartParams,
};

use anyhow::Result;

/// Client-side contract for live session negotiation.
///
/// Implemented by [`HttpSessionService`] in production and by fakes in tests.
/// Every method is a single network attempt; failures carry the underlying
/// cause and are never retried internally.
#[async_trait::async_trait]
pub trait SessionNegotiator: Send + Sync {
    /// Create a new session as host and obtain its join credential
    async fn create_session(&self, params: &StartParams) -> Result<SessionGrant>;

    /// Join an existing session with the given role
    async fn join_session(&self, session_id: &str, role: Role) -> Result<SessionGrant>;

    /// Post end-of-session metadata. Single attempt, not retried.
    async fn finalize(&self, session_id: &str, metadata: &EndMetadata) -> Result<FinalizeAck>;
}

/// Contract for undoing a draft resource during its grace period.
///
/// Kept separate from [`SessionNegotiator`] so the publish commit flow stays
/// decoupled from live sessions; [`HttpSessionService`] implements both.
#[async_trait::async_trait]
pub trait DraftService: Send + Sync {
    /// Delete/undo the draft resource. Single attempt, not retried.
    async fn cancel_draft(&self, resource_id: &str) -> Result<()>;
}
