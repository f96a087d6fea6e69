pub mod console;
pub mod presentation;
pub mod reconcile;

use crate::client::types::ProgressSnapshot;

pub use console::ConsoleView;
pub use presentation::{format_bytes, Badge};
pub use reconcile::{reconcile, ReconcilePlan, TaskBoard, TaskCard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// Transient user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn timed_out() -> Self {
        Self::new(
            NoticeLevel::Warning,
            "Polling timed out",
            "Stopped waiting for the batch; progress polling exceeded its time limit.",
        )
    }
}

/// Zip download and open-folder are only offered while a batch folder exists.
pub fn folder_actions_enabled(snapshot: &ProgressSnapshot) -> bool {
    snapshot.active_folder().is_some()
}

/// Sink for everything the poller wants shown. Implementations only read
/// what they are given.
pub trait ProgressView: Send {
    /// No batch is active: show the empty state and drop every task view.
    fn show_empty_state(&mut self);

    /// Counters, folder actions and task list from a snapshot with tasks.
    fn update(&mut self, snapshot: &ProgressSnapshot);

    fn show_completion(&mut self, completed: u64, folder: Option<&str>);

    fn show_notice(&mut self, notice: Notice);
}
