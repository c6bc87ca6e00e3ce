use chrono::NaiveDate;
use serde::Serialize;

use crate::task::Task;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OccasionSource {
    Islamic,
    National,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Task {
        completed: bool,
        /// Anchor task id; set on every instance after the first.
        #[serde(rename = "originalTaskId", skip_serializing_if = "Option::is_none")]
        original_task_id: Option<String>,
    },
    Occasion {
        source: OccasionSource,
    },
}

/// An entry shown in a day cell. `date` has date-only semantics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl CalendarEvent {
    /// Materialize recurrence instance `index` of `task` on `date`.
    pub fn task_instance(task: &Task, index: u32, date: NaiveDate) -> Self {
        let (id, original_task_id) = if index == 0 {
            (task.id.clone(), None)
        } else {
            (task.instance_id(index), Some(task.id.clone()))
        };
        Self {
            id,
            title: task.title.clone(),
            date,
            kind: EventKind::Task {
                completed: task.is_instance_completed(index),
                original_task_id,
            },
        }
    }

    pub fn occasion(id: String, title: String, date: NaiveDate, source: OccasionSource) -> Self {
        Self {
            id,
            title,
            date,
            kind: EventKind::Occasion { source },
        }
    }

    pub fn is_task(&self) -> bool {
        matches!(self.kind, EventKind::Task { .. })
    }

    pub fn is_occasion(&self) -> bool {
        matches!(self.kind, EventKind::Occasion { .. })
    }

    /// `None` for occasions.
    pub fn completed(&self) -> Option<bool> {
        match &self.kind {
            EventKind::Task { completed, .. } => Some(*completed),
            EventKind::Occasion { .. } => None,
        }
    }

    pub fn original_task_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Task {
                original_task_id, ..
            } => original_task_id.as_deref(),
            EventKind::Occasion { .. } => None,
        }
    }

    /// True when this event is the anchor of `task_id` or one of its instances.
    pub fn belongs_to(&self, task_id: &str) -> bool {
        self.is_task() && (self.id == task_id || self.original_task_id() == Some(task_id))
    }
}
