use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::datetime::iso_datetime_serde;

/// Upper bound on recurrence instances, enforced when a task is created.
pub const MAX_RECURRENCE_COUNT: i32 = 365;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// Unknown tags read as `None` so older and newer records stay loadable.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "daily" => Recurrence::Daily,
            "weekly" => Recurrence::Weekly,
            "monthly" => Recurrence::Monthly,
            _ => Recurrence::None,
        }
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Recurrence::from_tag).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(with = "iso_datetime_serde")]
    pub created_at: DateTime<Local>,

    #[serde(default, alias = "recurring")]
    pub recurrence: Recurrence,

    #[serde(default, alias = "recurringCount", deserialize_with = "lenient_count")]
    pub recurrence_count: i32,

    /// Instance indices (>= 1) marked done; the anchor uses `completed`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub completed_instances: BTreeSet<u32>,
}

impl Task {
    pub fn new(title: String, created_at: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: None,
            completed: false,
            created_at,
            recurrence: Recurrence::None,
            recurrence_count: 0,
            completed_instances: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    /// Count is clamped to `0..=MAX_RECURRENCE_COUNT`; `None` forces 0.
    pub fn with_recurrence(mut self, recurrence: Recurrence, count: i32) -> Self {
        self.recurrence = recurrence;
        self.recurrence_count = match recurrence {
            Recurrence::None => 0,
            _ => count.clamp(0, MAX_RECURRENCE_COUNT),
        };
        self
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence != Recurrence::None && self.recurrence_count > 0
    }

    /// Number of calendar instances this task expands to.
    pub fn instance_count(&self) -> u32 {
        if self.is_recurring() {
            self.recurrence_count as u32
        } else {
            1
        }
    }

    pub fn instance_id(&self, index: u32) -> String {
        if index == 0 {
            self.id.clone()
        } else {
            format!("{}-{}", self.id, index)
        }
    }

    /// Instance index encoded in `event_id`, if it names this task or one
    /// of its instances.
    pub fn instance_index(&self, event_id: &str) -> Option<u32> {
        if event_id == self.id {
            return Some(0);
        }
        let suffix = event_id.strip_prefix(self.id.as_str())?.strip_prefix('-')?;
        let index: u32 = suffix.parse().ok()?;
        (index >= 1 && index < self.instance_count()).then_some(index)
    }

    pub fn is_instance_completed(&self, index: u32) -> bool {
        if index == 0 {
            self.completed
        } else {
            self.completed_instances.contains(&index)
        }
    }

    /// Flip completion of one instance and return the new state.
    pub fn toggle_instance(&mut self, index: u32) -> bool {
        if index == 0 {
            self.completed = !self.completed;
            self.completed
        } else if self.completed_instances.remove(&index) {
            false
        } else {
            self.completed_instances.insert(index);
            true
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw
        .map(|n| n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        .unwrap_or(0))
}
