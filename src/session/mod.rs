//! Live session orchestration
//!
//! This module provides the `LiveSessionController` that composes:
//! - Credential negotiation with the coordination service
//! - Media transport connection lifecycle
//! - The exclusive device audio session
//! - The lifecycle event journal
//!
//! into one host-or-listener live session lifecycle.

mod controller;
mod state;

pub use controller::LiveSessionController;
pub use state::LiveSessionState;
