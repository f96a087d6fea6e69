use super::presentation::{self, Badge};
use crate::client::types::{TaskId, TaskStatus, TaskView};
use std::collections::HashSet;

/// What has to happen to the displayed task list for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_create: Vec<TaskId>,
    pub to_update: Vec<TaskId>,
    pub to_remove: Vec<TaskId>,
}

impl ReconcilePlan {
    pub fn is_noop_structurally(&self) -> bool {
        self.to_create.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff the ids currently shown against an incoming task list.
///
/// `to_create` and `to_update` follow snapshot order, `to_remove` follows
/// `prev_ids` order. A repeated id in `tasks` is planned once.
pub fn reconcile<'a, I>(prev_ids: I, tasks: &[TaskView]) -> ReconcilePlan
where
    I: IntoIterator<Item = &'a TaskId>,
{
    let prev: Vec<&TaskId> = prev_ids.into_iter().collect();
    let existing: HashSet<&TaskId> = prev.iter().copied().collect();
    let mut seen: HashSet<&TaskId> = HashSet::new();
    let mut plan = ReconcilePlan::default();

    for task in tasks {
        if !seen.insert(&task.id) {
            continue;
        }
        if existing.contains(&task.id) {
            plan.to_update.push(task.id.clone());
        } else {
            plan.to_create.push(task.id.clone());
        }
    }

    plan.to_remove = prev
        .into_iter()
        .filter(|id| !seen.contains(*id))
        .cloned()
        .collect();

    plan
}

/// Rendered state of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCard {
    pub id: TaskId,
    pub url: String,
    pub filename: String,
    pub status: TaskStatus,
    pub label: String,
    pub badge: Badge,
    pub caption: String,
    pub progress: f64,
    pub size_info: String,
    pub error: Option<String>,
}

impl TaskCard {
    fn from_task(task: &TaskView) -> Self {
        let p = presentation::present(task);
        Self {
            id: task.id.clone(),
            url: task.url.clone(),
            filename: presentation::filename_label(task).to_string(),
            status: task.status.clone(),
            label: p.label,
            badge: p.badge,
            caption: p.caption,
            progress: task.progress.clamp(0.0, 100.0),
            size_info: presentation::size_info(task),
            error: task.error.clone(),
        }
    }
}

/// Ordered, id-keyed list of task cards. Existing cards keep their
/// position, new cards are appended.
#[derive(Debug, Default)]
pub struct TaskBoard {
    cards: Vec<TaskCard>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[TaskCard] {
        &self.cards
    }

    pub fn ids(&self) -> impl Iterator<Item = &TaskId> {
        self.cards.iter().map(|c| &c.id)
    }

    pub fn get(&self, id: &TaskId) -> Option<&TaskCard> {
        self.cards.iter().find(|c| &c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Bring the board in line with `tasks` and return the plan applied.
    pub fn apply(&mut self, tasks: &[TaskView]) -> ReconcilePlan {
        let plan = reconcile(self.ids(), tasks);

        let removed: HashSet<&TaskId> = plan.to_remove.iter().collect();
        self.cards.retain(|c| !removed.contains(&c.id));

        for task in tasks {
            let card = TaskCard::from_task(task);
            match self.cards.iter_mut().find(|c| c.id == task.id) {
                Some(existing) => *existing = card,
                None => self.cards.push(card),
            }
        }

        plan
    }
}
