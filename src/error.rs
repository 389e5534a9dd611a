use thiserror::Error;

/// Errors surfaced by the live session lifecycle.
///
/// Network- and transport-origin variants carry the underlying cause and are
/// recoverable by retrying the whole operation at the calling layer; nothing
/// in this crate retries internally.
#[derive(Debug, Error)]
pub enum LiveSessionError {
    /// The coordination service refused or failed the credential request.
    #[error("credential request failed: {0}")]
    CredentialRequest(#[source] anyhow::Error),

    /// The media transport could not establish a connection.
    #[error("transport connect failed: {0}")]
    TransportConnect(#[source] anyhow::Error),

    /// The transport dropped without a local disconnect request.
    #[error("transport disconnected unexpectedly: {reason}")]
    DisconnectedUnexpectedly { reason: String },

    /// The transport rejected a microphone toggle; local state was rolled back.
    #[error("microphone toggle rejected: {0}")]
    MicToggleRejected(#[source] anyhow::Error),

    /// The device audio route could not be activated.
    #[error("audio route activation failed: {0}")]
    AudioRoute(#[source] anyhow::Error),

    /// End-of-session finalize call failed. Local teardown has already
    /// completed; only the remote metadata post is outstanding.
    #[error("session finalize failed: {0}")]
    Finalize(#[source] anyhow::Error),

    /// An async result arrived for a generation that is no longer current.
    /// Informational: the result was discarded and journaled, current state is
    /// untouched. Not meant for user-facing display.
    #[error("result superseded by a newer lifecycle operation")]
    Superseded,

    /// Caller bug: the operation is not valid in the current state.
    #[error("invalid transition: cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },
}

/// Errors surfaced by the deferred publish commit flow.
#[derive(Debug, Error)]
pub enum CommitError {
    /// A task is already counting down; overlapping undo windows are not
    /// permitted. The existing task is unaffected.
    #[error("a commit task is already pending for resource {resource_id}")]
    AlreadyPending { resource_id: String },

    /// Cancellation was applied locally but the draft delete call failed, so
    /// the remote resource state is ambiguous and needs manual follow-up.
    #[error("cancel succeeded locally but draft delete failed for {resource_id}: {source}")]
    CancelFailed {
        resource_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// Caller bug: no task exists, or the task is already terminal.
    #[error("invalid transition: cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },
}
