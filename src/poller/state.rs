use crate::client::types::ProgressSnapshot;
use std::time::Duration;

/// Identifies one run of the poll timer. Every start issues a fresh handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// State owned by the poller, threaded through [`evaluate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    /// Session is live; an inactive state never starts a timer.
    pub active: bool,
    pub timer: Option<TimerHandle>,
    pub completion_notified: bool,
    pub elapsed_since_poll_start: Duration,
    issued: u64,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_polling(&self) -> bool {
        self.timer.is_some()
    }

    fn start_timer(&mut self, effects: &mut Vec<Effect>) {
        self.issued += 1;
        let handle = TimerHandle(self.issued);
        self.timer = Some(handle);
        effects.push(Effect::StartTimer(handle));
    }

    fn stop_timer(&mut self, effects: &mut Vec<Effect>) {
        if let Some(handle) = self.timer.take() {
            effects.push(Effect::StopTimer(handle));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// No batch: show the empty state and clear every task view.
    ShowEmptyState,
    /// Refresh counters, folder actions and task views from the snapshot.
    UpdateDisplay,
    StartTimer(TimerHandle),
    StopTimer(TimerHandle),
    ShowCompletionNotice {
        completed: u64,
        folder: Option<String>,
    },
    ResetCompletionFlag,
}

/// Decide the next state and the effects to apply for a freshly fetched
/// snapshot. Pure: no I/O, no clock.
pub fn evaluate(state: &PollState, snapshot: &ProgressSnapshot) -> (PollState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    if snapshot.total == 0 {
        effects.push(Effect::ShowEmptyState);
        next.stop_timer(&mut effects);
        if next.completion_notified {
            next.completion_notified = false;
            effects.push(Effect::ResetCompletionFlag);
        }
        return (next, effects);
    }

    effects.push(Effect::UpdateDisplay);

    if next.active && snapshot.has_active_tasks() && next.timer.is_none() {
        next.start_timer(&mut effects);
    }

    let all_done = snapshot.is_all_done();
    if all_done && !next.completion_notified {
        next.completion_notified = true;
        next.stop_timer(&mut effects);
        effects.push(Effect::ShowCompletionNotice {
            completed: snapshot.completed,
            folder: snapshot.active_folder().map(str::to_string),
        });
    } else if !all_done && next.completion_notified {
        // A new batch started on the same session after a completed one.
        next.completion_notified = false;
        effects.push(Effect::ResetCompletionFlag);
        if next.active && next.timer.is_none() && snapshot.finished() < snapshot.total {
            next.start_timer(&mut effects);
        }
    }

    (next, effects)
}
