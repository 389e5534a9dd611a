//! Deferred publish commit flow
//!
//! After a recording upload succeeds, the resource is already live server-side
//! as a draft; this module runs the grace-period countdown that either lets it
//! auto-publish at zero or cancels it with a single delete call. Independent
//! of live sessions; shares only the journal pattern.

mod controller;
mod task;
mod ticker;

pub use controller::PublishCommitController;
pub use task::{CommitState, CommitTask};
pub use ticker::{SleepTicker, Ticker};
