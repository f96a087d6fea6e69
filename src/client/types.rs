use crate::error::BatchResult;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Task identifier as reported by the server. Strings and integers are both
/// accepted and normalised to a string key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawTaskId", into = "String")]
pub struct TaskId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTaskId {
    Text(String),
    Number(u64),
}

impl From<RawTaskId> for TaskId {
    fn from(raw: RawTaskId) -> Self {
        match raw {
            RawTaskId::Text(s) => TaskId(s),
            RawTaskId::Number(n) => TaskId(n.to_string()),
        }
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId(n.to_string())
    }
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of one task. Values outside the known vocabulary are kept verbatim
/// in `Unrecognized` instead of failing the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    Downloading,
    Completed,
    Error,
    Skipped,
    ZipCreated,
    Unrecognized(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Downloading => "downloading",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
            TaskStatus::Skipped => "skipped",
            TaskStatus::ZipCreated => "zip_created",
            TaskStatus::Unrecognized(raw) => raw,
        }
    }

    /// Pending and downloading tasks keep the poller alive.
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Downloading)
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => TaskStatus::Pending,
            "downloading" => TaskStatus::Downloading,
            "completed" => TaskStatus::Completed,
            "error" => TaskStatus::Error,
            "skipped" => TaskStatus::Skipped,
            "zip_created" => TaskStatus::ZipCreated,
            _ => TaskStatus::Unrecognized(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub downloaded_bytes: u64,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub error: Option<String>,
}

/// One full progress readout from `GET /get_progress`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub download_speed: f64,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskView>,
}

impl ProgressSnapshot {
    /// Output folder of the current batch, `None` when empty or absent.
    pub fn active_folder(&self) -> Option<&str> {
        self.folder.as_deref().filter(|f| !f.is_empty())
    }

    pub fn finished(&self) -> u64 {
        self.completed + self.errors + self.skipped
    }

    pub fn has_active_tasks(&self) -> bool {
        self.tasks.iter().any(|t| t.status.is_active())
    }

    pub fn is_all_done(&self) -> bool {
        self.total > 0 && self.finished() == self.total
    }

    /// Whether the server's counters add up to `total`.
    pub fn is_consistent(&self) -> bool {
        self.finished() + self.pending == self.total
    }
}

/// Form body of `POST /start_download`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchRequest {
    pub urls: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename_pattern: Option<String>,
    #[serde(skip_serializing_if = "is_unchecked", serialize_with = "checkbox")]
    pub auto_zip: bool,
    #[serde(skip_serializing_if = "is_unchecked", serialize_with = "checkbox")]
    pub skip_invalid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_downloads: Option<u32>,
    /// Local cookie file uploaded as the `cookie_file` part. Its presence
    /// switches the body to multipart.
    #[serde(skip)]
    pub cookie_file: Option<PathBuf>,
}

impl BatchRequest {
    /// Text fields of the form as they are posted, skipping unset ones.
    pub fn form_fields(&self) -> BatchResult<Vec<(String, String)>> {
        let value = serde_json::to_value(self)?;
        let fields = match value {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(name, value)| match value {
                    serde_json::Value::String(text) => (name, text),
                    other => (name, other.to_string()),
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(fields)
    }
}

fn is_unchecked(value: &bool) -> bool {
    !*value
}

// HTML checkboxes post "on" when set and are omitted otherwise.
fn checkbox<S: Serializer>(_: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("on")
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub status: String,
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenFolderResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
