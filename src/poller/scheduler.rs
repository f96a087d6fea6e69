use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Clock and timer port used by the poller.
///
/// The poller never sleeps on its own; every wait goes through this trait so
/// tests can drive time explicitly.
#[async_trait]
pub trait Scheduler: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, period: Duration);
}

/// Production scheduler backed by the tokio timer.
///
/// Under `tokio::time::pause()` this follows the paused clock as well.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}
