use std::time::Duration;

/// Countdown clock abstraction.
///
/// The commit controller awaits `wait` once per countdown second. Injecting
/// the clock keeps the countdown deterministic in tests instead of
/// wall-clock-dependent.
#[async_trait::async_trait]
pub trait Ticker: Send + Sync {
    /// Suspend until the next countdown tick is due
    async fn wait(&self);
}

/// Production ticker: one tick per wall-clock second.
pub struct SleepTicker {
    period: Duration,
}

impl SleepTicker {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn one_hz() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait::async_trait]
impl Ticker for SleepTicker {
    async fn wait(&self) {
        tokio::time::sleep(self.period).await;
    }
}
