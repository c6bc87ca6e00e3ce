use std::str::FromStr;

use anyhow::anyhow;
use serde::{
  Deserialize,
  Serialize
};

use crate::task::Task;

/// Task list view selector.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
  #[default]
  All,
  Active,
  Completed
}

impl TaskFilter {
  pub fn matches(
    self,
    task: &Task
  ) -> bool {
    match self {
      | TaskFilter::All => true,
      | TaskFilter::Active => {
        !task.completed
      }
      | TaskFilter::Completed => {
        task.completed
      }
    }
  }

  pub fn apply<'a>(
    self,
    tasks: &'a [Task]
  ) -> Vec<&'a Task> {
    tasks
      .iter()
      .filter(|task| self.matches(task))
      .collect()
  }
}

impl FromStr for TaskFilter {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "all" => Ok(TaskFilter::All),
      | "active" | "pending" => {
        Ok(TaskFilter::Active)
      }
      | "completed" | "done" => {
        Ok(TaskFilter::Completed)
      }
      | other => {
        Err(anyhow!(
          "unknown task filter: {other}"
        ))
      }
    }
  }
}

/// Counts over stored task records (anchors, not expanded instances).
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct TaskStats {
  pub total:     usize,
  pub completed: usize,
  pub active:    usize
}

impl TaskStats {
  pub fn from_tasks(
    tasks: &[Task]
  ) -> Self {
    let completed = tasks
      .iter()
      .filter(|t| t.completed)
      .count();
    Self {
      total: tasks.len(),
      completed,
      active: tasks.len() - completed
    }
  }

  /// Whole percent, rounded half up; 0 with no tasks.
  pub fn completion_rate(&self) -> u32 {
    if self.total == 0 {
      return 0;
    }
    ((self.completed * 200 + self.total)
      / (self.total * 2)) as u32
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    Local,
    TimeZone
  };

  use super::{
    TaskFilter,
    TaskStats
  };
  use crate::task::Task;

  fn tasks() -> Vec<Task> {
    let now = Local
      .with_ymd_and_hms(
        2026, 2, 16, 5, 0, 0
      )
      .single()
      .expect("valid local");
    let mut done =
      Task::new("done".to_string(), now);
    done.completed = true;
    vec![
      Task::new("a".to_string(), now),
      Task::new("b".to_string(), now),
      done,
    ]
  }

  #[test]
  fn filters_by_completion() {
    let tasks = tasks();
    assert_eq!(
      TaskFilter::All.apply(&tasks).len(),
      3
    );
    assert_eq!(
      TaskFilter::Active
        .apply(&tasks)
        .len(),
      2
    );
    let completed =
      TaskFilter::Completed.apply(&tasks);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title, "done");
  }

  #[test]
  fn parses_filter_names() {
    assert_eq!(
      "Active"
        .parse::<TaskFilter>()
        .expect("parse"),
      TaskFilter::Active
    );
    assert!(
      "someday"
        .parse::<TaskFilter>()
        .is_err()
    );
  }

  #[test]
  fn stats_and_rounded_rate() {
    let stats =
      TaskStats::from_tasks(&tasks());
    assert_eq!(
      stats,
      TaskStats {
        total:     3,
        completed: 1,
        active:    2
      }
    );
    assert_eq!(stats.completion_rate(), 33);

    let two_thirds = TaskStats {
      total:     3,
      completed: 2,
      active:    1
    };
    assert_eq!(
      two_thirds.completion_rate(),
      67
    );
    assert_eq!(
      TaskStats::default()
        .completion_rate(),
      0
    );
  }
}
