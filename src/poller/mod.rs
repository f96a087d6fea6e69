pub mod scheduler;
pub mod state;

pub use scheduler::{Scheduler, TokioScheduler};
pub use state::{evaluate, Effect, PollState, TimerHandle};

use crate::client::types::ProgressSnapshot;
use crate::client::ProgressSource;
use crate::config::PollerConfig;
use crate::view::{Notice, ProgressView};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How a polling session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No timer left running and no batch completed in this session.
    Idle,
    Completed,
    TimedOut,
    Cancelled,
}

/// Stops a running poller between polls.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    shutdown: Arc<Notify>,
}

impl PollerHandle {
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Drives `GET /get_progress` against the decision rules in [`evaluate`].
///
/// Exactly one fetch is in flight at a time: the next wait is only decided
/// after the previous snapshot has been applied.
pub struct ProgressPoller<S, V> {
    source: Arc<S>,
    view: V,
    scheduler: Arc<dyn Scheduler>,
    config: PollerConfig,
    state: PollState,
    started_at: Option<Instant>,
    shutdown: Arc<Notify>,
}

impl<S, V> ProgressPoller<S, V>
where
    S: ProgressSource + 'static,
    V: ProgressView + 'static,
{
    pub fn new(source: Arc<S>, view: V, config: PollerConfig) -> Self {
        Self {
            source,
            view,
            scheduler: Arc::new(TokioScheduler),
            config,
            state: PollState::new(),
            started_at: None,
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn handle(&self) -> PollerHandle {
        PollerHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Begin the session with one immediate fetch. Only the first call has
    /// any effect.
    pub async fn start(&mut self) {
        if self.started_at.is_some() {
            tracing::warn!("Progress poller already started");
            return;
        }

        self.started_at = Some(self.scheduler.now());
        self.state.active = true;
        self.poll().await;
    }

    /// Fetch and apply one snapshot. Failures are logged and leave the state
    /// untouched; the next tick retries.
    pub async fn poll(&mut self) -> bool {
        match self.source.fetch_progress().await {
            Ok(snapshot) => {
                self.apply(&snapshot);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to fetch progress: {}", e);
                false
            }
        }
    }

    fn apply(&mut self, snapshot: &ProgressSnapshot) {
        tracing::debug!(
            total = snapshot.total,
            completed = snapshot.completed,
            errors = snapshot.errors,
            skipped = snapshot.skipped,
            pending = snapshot.pending,
            "Progress snapshot received"
        );
        if !snapshot.is_consistent() {
            tracing::debug!("Snapshot counters do not add up to total {}", snapshot.total);
        }

        let (next, effects) = evaluate(&self.state, snapshot);
        self.state = next;

        for effect in effects {
            match effect {
                Effect::ShowEmptyState => self.view.show_empty_state(),
                Effect::UpdateDisplay => self.view.update(snapshot),
                Effect::StartTimer(handle) => {
                    tracing::info!(timer = handle.id(), "Polling started: active tasks detected");
                }
                Effect::StopTimer(handle) => {
                    tracing::info!(timer = handle.id(), "Polling stopped");
                }
                Effect::ShowCompletionNotice { completed, folder } => {
                    tracing::info!(completed, folder = ?folder, "Batch complete");
                    self.view.show_completion(completed, folder.as_deref());
                }
                Effect::ResetCompletionFlag => {
                    tracing::debug!("Completion flag reset");
                }
            }
        }
    }

    /// `start()` followed by the timer loop.
    pub async fn run(&mut self) -> PollOutcome {
        self.start().await;

        while self.state.is_polling() {
            let wait = self.next_wait();
            let cancelled = tokio::select! {
                _ = self.scheduler.sleep(wait) => false,
                _ = self.shutdown.notified() => true,
            };

            if cancelled {
                self.cancel();
                return PollOutcome::Cancelled;
            }

            self.refresh_elapsed();
            if self.is_timed_out() {
                self.handle_timeout().await;
                return PollOutcome::TimedOut;
            }

            self.poll().await;
        }

        if self.state.completion_notified {
            PollOutcome::Completed
        } else {
            PollOutcome::Idle
        }
    }

    /// Run the poller on a background tokio task.
    pub fn spawn(mut self) -> (PollerHandle, JoinHandle<PollOutcome>) {
        let handle = self.handle();
        let task = tokio::spawn(async move { self.run().await });
        (handle, task)
    }

    fn next_wait(&self) -> Duration {
        let interval = self.config.interval();
        match self.config.timeout() {
            Some(limit) => interval.min(limit.saturating_sub(self.state.elapsed_since_poll_start)),
            None => interval,
        }
    }

    fn refresh_elapsed(&mut self) {
        if let Some(started) = self.started_at {
            self.state.elapsed_since_poll_start = self.scheduler.now().saturating_duration_since(started);
        }
    }

    fn is_timed_out(&self) -> bool {
        self.config
            .timeout()
            .is_some_and(|limit| self.state.elapsed_since_poll_start >= limit)
    }

    async fn handle_timeout(&mut self) {
        self.state.timer = None;
        self.state.active = false;
        tracing::warn!(
            elapsed = ?self.state.elapsed_since_poll_start,
            "Polling timed out"
        );
        self.view.show_notice(Notice::timed_out());

        if let Err(e) = self.source.clear_status().await {
            tracing::warn!("Failed to clear server status after timeout: {}", e);
        }
    }

    fn cancel(&mut self) {
        self.state.timer = None;
        self.state.active = false;
        tracing::info!("Progress poller shut down");
    }
}
