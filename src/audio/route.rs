use anyhow::Result;
use tracing::info;

/// Device audio routing backend.
///
/// Platform-specific implementations configure the device's input/output
/// routing for live audio (e.g. voice-chat category, speaker output). A fake
/// implementation substitutes for hardware in tests.
pub trait AudioRoute: Send + Sync {
    /// Configure and activate the device route for live audio
    fn activate(&mut self) -> Result<()>;

    /// Deactivate the route and restore the previous device state
    fn deactivate(&mut self) -> Result<()>;

    /// Get route name for logging
    fn name(&self) -> &str;
}

/// Default system route.
///
/// The surrounding application wires the real platform session (audio unit /
/// media session) into this type; the orchestration core only depends on
/// activate/deactivate succeeding.
pub struct SystemAudioRoute;

impl AudioRoute for SystemAudioRoute {
    fn activate(&mut self) -> Result<()> {
        info!("Activating system audio route");
        Ok(())
    }

    fn deactivate(&mut self) -> Result<()> {
        info!("Deactivating system audio route");
        Ok(())
    }

    fn name(&self) -> &str {
        "system"
    }
}
