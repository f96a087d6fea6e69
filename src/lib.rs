//! # BurnCloud Batch Download Client
//!
//! Client for a remote batch download server.
//!
//! ## Features
//!
//! - Typed HTTP client for the batch endpoints (submit, progress, open folder,
//!   zip archive, clear status)
//! - Adaptive progress polling: polls only while tasks are pending or
//!   downloading, and reports each finished batch exactly once
//! - Pure decision function and injectable scheduler for deterministic tests
//! - Keyed task list reconciliation and a terminal renderer

pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod submission;
pub mod view;

pub use client::types::{BatchRequest, ProgressSnapshot, TaskId, TaskStatus, TaskView};
pub use client::{BatchClient, ProgressSource};
pub use config::{Config, PollerConfig, ServerConfig, DEFAULT_SERVER_URL};
pub use error::{BatchError, BatchResult};
pub use poller::{PollOutcome, PollerHandle, ProgressPoller};
pub use view::{ConsoleView, Notice, NoticeLevel, ProgressView};
