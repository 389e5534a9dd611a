use anyhow::{Context, Result};
use tracing::{info, warn};

use super::route::AudioRoute;

/// Exclusive holder of the device audio resource.
///
/// Models a singular physical resource: at most one holder at a time. The
/// session is constructed once by the application and shared with whichever
/// controller currently needs the device. `acquire` is idempotent for the
/// holder that already owns the route; a second, different holder attempting
/// to acquire is a caller bug and panics rather than returning a recoverable
/// error.
pub struct AudioHardwareSession {
    route: Box<dyn AudioRoute>,
    holder: Option<String>,
}

impl AudioHardwareSession {
    pub fn new(route: Box<dyn AudioRoute>) -> Self {
        Self {
            route,
            holder: None,
        }
    }

    /// Acquire the device route on behalf of `holder`.
    ///
    /// No-op if `holder` already owns it. Route activation failure is
    /// recoverable and leaves the session unheld.
    ///
    /// # Panics
    ///
    /// Panics if a different holder currently owns the session.
    pub fn acquire(&mut self, holder: &str) -> Result<()> {
        match &self.holder {
            Some(current) if current == holder => {
                // Idempotent re-acquire
                Ok(())
            }
            Some(current) => {
                panic!(
                    "audio hardware session already held by {} (attempted acquire by {})",
                    current, holder
                );
            }
            None => {
                self.route
                    .activate()
                    .with_context(|| format!("Failed to activate {} audio route", self.route.name()))?;

                info!("Audio hardware session acquired by {}", holder);
                self.holder = Some(holder.to_string());
                Ok(())
            }
        }
    }

    /// Release the device route. No-op if not held.
    ///
    /// A release by a non-owner is ignored (and logged) rather than treated
    /// as an error, so teardown paths can call it unconditionally.
    pub fn release(&mut self, holder: &str) {
        match &self.holder {
            None => {}
            Some(current) if current != holder => {
                warn!(
                    "Ignoring audio session release by {} (held by {})",
                    holder, current
                );
            }
            Some(_) => {
                if let Err(e) = self.route.deactivate() {
                    warn!("Failed to deactivate audio route on release: {}", e);
                }
                info!("Audio hardware session released by {}", holder);
                self.holder = None;
            }
        }
    }

    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }

    /// Current holder id, if any
    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }
}
