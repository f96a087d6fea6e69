use crate::client::types::{TaskStatus, TaskView};

/// Badge colour of a task status, named after the CSS classes the web page uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Secondary,
    Primary,
    Success,
    Danger,
    Warning,
    Info,
}

impl Badge {
    pub fn css_class(&self) -> &'static str {
        match self {
            Badge::Secondary => "bg-secondary",
            Badge::Primary => "bg-primary",
            Badge::Success => "bg-success",
            Badge::Danger => "bg-danger",
            // dark text for contrast on yellow
            Badge::Warning => "bg-warning text-dark",
            Badge::Info => "bg-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub label: String,
    pub badge: Badge,
    pub caption: String,
}

/// Status → (label, badge, progress caption)
pub fn present(task: &TaskView) -> Presentation {
    let percent = format!("{:.1}%", task.progress);
    let (badge, caption) = match &task.status {
        TaskStatus::Pending => (Badge::Secondary, "Pending".to_string()),
        TaskStatus::Downloading => (Badge::Primary, percent),
        TaskStatus::Completed => (Badge::Success, "Completed".to_string()),
        TaskStatus::Error => (Badge::Danger, "Error".to_string()),
        TaskStatus::Skipped => (Badge::Warning, "Skipped".to_string()),
        TaskStatus::ZipCreated => (Badge::Info, "ZIP Created".to_string()),
        TaskStatus::Unrecognized(_) => (Badge::Secondary, percent),
    };

    Presentation {
        label: capitalize(task.status.as_str()),
        badge,
        caption,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format bytes with 1024-based units and up to two decimals
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// "downloaded / total", shown only while bytes are meaningful
pub fn size_info(task: &TaskView) -> String {
    let shows_bytes = matches!(task.status, TaskStatus::Downloading | TaskStatus::Completed);
    if shows_bytes && task.total_bytes > 0 {
        format!("{} / {}", format_bytes(task.downloaded_bytes), format_bytes(task.total_bytes))
    } else {
        String::new()
    }
}

pub fn filename_label(task: &TaskView) -> &str {
    task.filename.as_deref().unwrap_or("Filename N/A")
}

pub fn format_speed(speed: f64) -> String {
    format!("{:.2}", speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::TaskId;

    fn task(status: TaskStatus, progress: f64) -> TaskView {
        TaskView {
            id: TaskId::from("t"),
            url: "https://example.com/video".to_string(),
            filename: None,
            status,
            progress,
            downloaded_bytes: 0,
            total_bytes: 0,
            error: None,
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_048_576), "1 MB");
        assert_eq!(format_bytes(1_572_864), "1.5 MB");
        assert_eq!(format_bytes(1_234_567_890), "1.15 GB");
    }

    #[test]
    fn test_format_bytes_caps_at_terabytes() {
        let five_pb = 5 * 1024u64.pow(5);
        assert_eq!(format_bytes(five_pb), "5120 TB");
    }

    #[test]
    fn test_presentation_table() {
        let cases = [
            (TaskStatus::Pending, "Pending", Badge::Secondary, "Pending"),
            (TaskStatus::Downloading, "Downloading", Badge::Primary, "42.3%"),
            (TaskStatus::Completed, "Completed", Badge::Success, "Completed"),
            (TaskStatus::Error, "Error", Badge::Danger, "Error"),
            (TaskStatus::Skipped, "Skipped", Badge::Warning, "Skipped"),
            (TaskStatus::ZipCreated, "Zip_created", Badge::Info, "ZIP Created"),
        ];

        for (status, label, badge, caption) in cases {
            let p = present(&task(status, 42.3));
            assert_eq!(p.label, label);
            assert_eq!(p.badge, badge);
            assert_eq!(p.caption, caption);
        }
    }

    #[test]
    fn test_unrecognized_status_is_neutral() {
        let p = present(&task(TaskStatus::Unrecognized("paused".to_string()), 10.0));
        assert_eq!(p.label, "Paused");
        assert_eq!(p.badge, Badge::Secondary);
        assert_eq!(p.caption, "10.0%");
        assert_eq!(p.badge.css_class(), "bg-secondary");
    }

    #[test]
    fn test_size_info_only_for_byte_bearing_states() {
        let mut t = task(TaskStatus::Downloading, 50.0);
        assert_eq!(size_info(&t), "");

        t.downloaded_bytes = 1536;
        t.total_bytes = 3072;
        assert_eq!(size_info(&t), "1.5 KB / 3 KB");

        t.status = TaskStatus::Pending;
        assert_eq!(size_info(&t), "");
    }

    #[test]
    fn test_filename_fallback() {
        let mut t = task(TaskStatus::Pending, 0.0);
        assert_eq!(filename_label(&t), "Filename N/A");
        t.filename = Some("clip.mp4".to_string());
        assert_eq!(filename_label(&t), "clip.mp4");
    }
}
