//! Exclusive device audio session
//!
//! This module owns the process-wide exclusive lock on the device's audio
//! input/output routing. The actual platform routing glue lives behind the
//! [`AudioRoute`] trait so the orchestration layer (and tests) never touch
//! real hardware directly.

mod route;
mod session;

pub use route::{AudioRoute, SystemAudioRoute};
pub use session::AudioHardwareSession;
