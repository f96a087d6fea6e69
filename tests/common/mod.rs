use async_trait::async_trait;
use burncloud_download_batch::poller::Scheduler;
use burncloud_download_batch::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// One scripted answer of the fake progress endpoint
#[derive(Debug, Clone)]
pub enum Step {
    Snapshot(ProgressSnapshot),
    Fail,
}

/// Progress source that replays a script. The last step repeats forever.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    fail_clear: bool,
    fetches: AtomicUsize,
    clears: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            fail_clear: false,
            fetches: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
        }
    }

    pub fn failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }

    pub fn push(&self, step: Step) {
        self.steps.lock().unwrap().push_back(step);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressSource for ScriptedSource {
    async fn fetch_progress(&self) -> BatchResult<ProgressSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let next = self.steps.lock().unwrap().pop_front();
        let step = match next {
            Some(step) => {
                *self.last.lock().unwrap() = Some(step.clone());
                step
            }
            None => self.last.lock().unwrap().clone().unwrap_or(Step::Fail),
        };

        match step {
            Step::Snapshot(snapshot) => Ok(snapshot),
            Step::Fail => Err(BatchError::Server {
                status: 503,
                message: "Service Unavailable".to_string(),
            }),
        }
    }

    async fn clear_status(&self) -> BatchResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear {
            return Err(BatchError::Server {
                status: 500,
                message: "clear failed".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Empty,
    Update { total: u64, completed: u64 },
    Completion { completed: u64, folder: Option<String> },
    Notice(Notice),
}

/// View that records what it was asked to show
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn completions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ViewEvent::Completion { .. }))
            .count()
    }

    pub fn notices(&self) -> Vec<&Notice> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}

impl ProgressView for RecordingView {
    fn show_empty_state(&mut self) {
        self.events.push(ViewEvent::Empty);
    }

    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.events.push(ViewEvent::Update {
            total: snapshot.total,
            completed: snapshot.completed,
        });
    }

    fn show_completion(&mut self, completed: u64, folder: Option<&str>) {
        self.events.push(ViewEvent::Completion {
            completed,
            folder: folder.map(str::to_string),
        });
    }

    fn show_notice(&mut self, notice: Notice) {
        self.events.push(ViewEvent::Notice(notice));
    }
}

/// Scheduler whose clock only moves when the poller sleeps on it
pub struct ManualScheduler {
    origin: Instant,
    slept: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            slept: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        let total: Duration = self.slept.lock().unwrap().iter().sum();
        self.origin + total
    }

    async fn sleep(&self, period: Duration) {
        self.slept.lock().unwrap().push(period);
    }
}

pub fn task(id: u64, status: TaskStatus) -> TaskView {
    TaskView {
        id: TaskId::from(id),
        url: format!("https://example.com/video/{}", id),
        filename: None,
        status,
        progress: 0.0,
        downloaded_bytes: 0,
        total_bytes: 0,
        error: None,
    }
}

/// `{total:3, completed:1, pending:2}` with two active tasks
pub fn running_batch() -> ProgressSnapshot {
    ProgressSnapshot {
        total: 3,
        completed: 1,
        pending: 2,
        folder: Some("batch".to_string()),
        tasks: vec![
            task(1, TaskStatus::Completed),
            task(2, TaskStatus::Downloading),
            task(3, TaskStatus::Pending),
        ],
        ..Default::default()
    }
}

/// `{total:3, completed:2, errors:1, pending:0}`
pub fn finished_batch() -> ProgressSnapshot {
    let mut failed = task(3, TaskStatus::Error);
    failed.error = Some("Unsupported URL".to_string());
    ProgressSnapshot {
        total: 3,
        completed: 2,
        errors: 1,
        folder: Some("batch".to_string()),
        tasks: vec![task(1, TaskStatus::Completed), task(2, TaskStatus::Completed), failed],
        ..Default::default()
    }
}
