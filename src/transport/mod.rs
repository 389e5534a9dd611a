//! Real-time media transport
//!
//! This module wraps the external media engine behind the [`MediaTransport`]
//! trait and drives its connection lifecycle as an explicit finite state
//! machine with a typed transition table, instead of ad hoc event-handler
//! flags. Engine callbacks arrive as [`TransportEvent`]s on a channel; the
//! [`TransportConnection`] deduplicates them so every state edge is observed
//! exactly once.

mod connection;
mod state;

pub use connection::{
    MediaTransport, ParticipantAudioState, TransportConnection, TransportEvent,
};
pub use state::{ConnectionEdge, ConnectionState};
