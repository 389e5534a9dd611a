//! livecast — client-side orchestration for live audio broadcast sessions
//! and deferred publish commits.
//!
//! Two workflows live here:
//! - hosting or joining a live audio session (credential negotiation,
//!   transport connection state machine, exclusive device audio session,
//!   lifecycle journal), driven by [`LiveSessionController`];
//! - the publish-with-grace-period commit flow (countdown, auto-publish,
//!   cancellable with a single undo call), driven by
//!   [`PublishCommitController`].
//!
//! Everything external — the coordination service, the media engine, the
//! device audio route, the countdown clock — sits behind a trait so callers
//! inject production implementations or test fakes.

pub mod audio;
pub mod error;
pub mod journal;
pub mod negotiation;
pub mod publish;
pub mod session;
pub mod transport;

pub use audio::{AudioHardwareSession, AudioRoute, SystemAudioRoute};
pub use error::{CommitError, LiveSessionError};
pub use journal::{EventJournal, EventLogEntry};
pub use negotiation::{
    DraftService, EndMetadata, FinalizeAck, HttpSessionService, JoinCredential, Role,
    SessionDescriptor, SessionGrant, SessionNegotiator, StartParams,
};
pub use publish::{CommitState, CommitTask, PublishCommitController, SleepTicker, Ticker};
pub use session::{LiveSessionController, LiveSessionState};
pub use transport::{
    ConnectionEdge, ConnectionState, MediaTransport, ParticipantAudioState, TransportConnection,
    TransportEvent,
};
