use super::presentation::format_speed;
use super::{folder_actions_enabled, Notice, NoticeLevel, ProgressView, TaskBoard, TaskCard};
use crate::client::types::ProgressSnapshot;
use std::io::Write;

/// Line-oriented terminal renderer used by the CLI.
///
/// Only cards touched by a snapshot are printed, and only when their
/// rendered text changed since the last print.
pub struct ConsoleView<W: Write + Send> {
    out: W,
    board: TaskBoard,
    printed: Vec<(String, String)>,
    empty_shown: bool,
}

impl ConsoleView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            board: TaskBoard::new(),
            printed: Vec::new(),
            empty_shown: false,
        }
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::debug!("Console write failed: {}", e);
        }
    }

    fn card_line(card: &TaskCard) -> String {
        let mut line = format!("  [{:<11}] {} {} ({})", card.label, card.caption, card.url, card.filename);
        if !card.size_info.is_empty() {
            line.push_str(&format!("  {}", card.size_info));
        }
        if let Some(error) = &card.error {
            line.push_str(&format!("  ! {}", error));
        }
        line
    }
}

impl<W: Write + Send> ProgressView for ConsoleView<W> {
    fn show_empty_state(&mut self) {
        self.board.clear();
        self.printed.clear();
        if !self.empty_shown {
            self.empty_shown = true;
            self.emit("No downloads in progress.");
        }
    }

    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.empty_shown = false;
        let plan = self.board.apply(&snapshot.tasks);
        self.printed.retain(|(id, _)| !plan.to_remove.iter().any(|r| r.as_str() == id));

        let summary = format!(
            "Total {} | Completed {} | Skipped {} | Errors {} | Pending {} | {} MB/s",
            snapshot.total,
            snapshot.completed,
            snapshot.skipped,
            snapshot.errors,
            snapshot.pending,
            format_speed(snapshot.download_speed),
        );
        self.emit(&summary);

        let actions = if folder_actions_enabled(snapshot) {
            format!(
                "  folder: {} (zip download / open folder available)",
                snapshot.active_folder().unwrap_or_default()
            )
        } else {
            "  folder: none (zip download / open folder disabled)".to_string()
        };
        self.emit(&actions);

        let lines: Vec<(String, String)> = self
            .board
            .cards()
            .iter()
            .map(|card| (card.id.as_str().to_string(), Self::card_line(card)))
            .collect();

        for (id, line) in lines {
            match self.printed.iter_mut().find(|(printed_id, _)| *printed_id == id) {
                Some((_, previous)) if *previous == line => {}
                Some((_, previous)) => {
                    *previous = line.clone();
                    self.emit(&line);
                }
                None => {
                    self.printed.push((id, line.clone()));
                    self.emit(&line);
                }
            }
        }
    }

    fn show_completion(&mut self, completed: u64, folder: Option<&str>) {
        let line = format!(
            "Batch complete: {} file(s) downloaded to {}.",
            completed,
            folder.unwrap_or("the downloads folder")
        );
        self.emit(&line);
    }

    fn show_notice(&mut self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Danger => "error",
        };
        let line = format!("[{}] {}: {}", tag, notice.title, notice.message);
        self.emit(&line);
    }
}
