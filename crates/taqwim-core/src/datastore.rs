use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::CalendarError;
use crate::event::CalendarEvent;
use crate::filter::{TaskFilter, TaskStats};
use crate::recurrence::expand_tasks;
use crate::task::{MAX_RECURRENCE_COUNT, Recurrence, Task};

pub const DEFAULT_STORE_KEY: &str = "taqwim.tasks";

/// Durable string store keyed by namespaced names.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// One `<key>.json` file per key inside `data_dir`.
#[derive(Debug)]
pub struct FileKvStore {
    pub data_dir: PathBuf,
}

impl FileKvStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        info!(data_dir = %data_dir.display(), "opened key-value store");
        Ok(Self { data_dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.data_dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileKvStore {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(file = %path.display(), "no record yet");
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        Ok(Some(raw))
    }

    #[tracing::instrument(skip(self, value))]
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        debug!(file = %path.display(), bytes = value.len(), "writing record atomically");

        let mut temp = NamedTempFile::new_in(&self.data_dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;
        temp.persist(&path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    map: HashMap<String, String>,
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Decode a persisted JSON array of tasks, skipping records that fail to
/// parse or repeat an earlier id.
pub fn decode_tasks(raw: &str) -> (Vec<Task>, Vec<CalendarError>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (vec![], vec![]);
    }

    let records: Vec<serde_json::Value> = match serde_json::from_str(trimmed) {
        Ok(records) => records,
        Err(err) => {
            error!(error = %err, "task record is not a JSON array; starting empty");
            return (
                vec![],
                vec![CalendarError::MalformedPersistedRecord {
                    index: 0,
                    reason: err.to_string(),
                }],
            );
        }
    };

    let mut tasks = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    let mut ids = HashSet::new();
    for (index, record) in records.into_iter().enumerate() {
        let reason = match serde_json::from_value::<Task>(record) {
            Ok(task) if ids.insert(task.id.clone()) => {
                tasks.push(task);
                continue;
            }
            Ok(task) => format!("duplicate id {}", task.id),
            Err(err) => err.to_string(),
        };
        warn!(index, reason = %reason, "skipping malformed task record");
        skipped.push(CalendarError::MalformedPersistedRecord { index, reason });
    }

    debug!(count = tasks.len(), skipped = skipped.len(), "decoded tasks");
    (tasks, skipped)
}

pub fn encode_tasks(tasks: &[Task]) -> anyhow::Result<String> {
    serde_json::to_string(tasks).context("failed to serialize tasks")
}

/// The task list plus its backing store. Every mutation is written through
/// before it becomes visible.
#[derive(Debug)]
pub struct TaskStore<S: KeyValueStore> {
    backend: S,
    key: String,
    tasks: Vec<Task>,
    max_recurrence: i32,
}

impl<S: KeyValueStore> TaskStore<S> {
    #[tracing::instrument(skip(backend, key))]
    pub fn load(backend: S, key: impl Into<String>) -> anyhow::Result<Self> {
        let key = key.into();
        let raw = backend
            .get(&key)
            .with_context(|| format!("failed to read task record {key}"))?;
        let (tasks, skipped) = raw.as_deref().map(decode_tasks).unwrap_or_default();
        info!(key = %key, loaded = tasks.len(), skipped = skipped.len(), "loaded task store");
        Ok(Self {
            backend,
            key,
            tasks,
            max_recurrence: MAX_RECURRENCE_COUNT,
        })
    }

    /// Lower the recurrence cap applied by `add`.
    pub fn with_max_recurrence(mut self, max: i32) -> Self {
        self.max_recurrence = max.clamp(1, MAX_RECURRENCE_COUNT);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filtered(&self, filter: TaskFilter) -> Vec<&Task> {
        filter.apply(&self.tasks)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Every event the stored tasks expand to. `horizon_end` is the
    /// caller's visible window.
    pub fn events(&self, horizon_end: NaiveDate) -> Vec<CalendarEvent> {
        expand_tasks(&self.tasks, horizon_end)
    }

    /// Insert `task` at the front of the list. The recurrence count is
    /// clamped (zeroed for non-recurring tasks) and a colliding id is
    /// replaced with a fresh one.
    #[tracing::instrument(skip(self, task), fields(title = %task.title))]
    pub fn add(&mut self, mut task: Task) -> anyhow::Result<&Task> {
        task.recurrence_count = match task.recurrence {
            Recurrence::None => 0,
            _ => task.recurrence_count.clamp(0, self.max_recurrence),
        };
        if task.title.trim().is_empty() {
            bail!("task title cannot be empty");
        }
        if self.tasks.iter().any(|t| t.id == task.id) {
            let fresh = Uuid::new_v4().to_string();
            warn!(old = %task.id, new = %fresh, "task id already in use; reassigning");
            task.id = fresh;
        }

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task);
        next.extend(self.tasks.iter().cloned());
        self.commit(next)?;
        info!(id = %self.tasks[0].id, "added task");
        Ok(&self.tasks[0])
    }

    /// Flip completion of the task or recurrence instance named by
    /// `event_id`. Returns the new state, or `None` if nothing matched.
    #[tracing::instrument(skip(self))]
    pub fn toggle(&mut self, event_id: &str) -> anyhow::Result<Option<bool>> {
        let Some((pos, index)) = self.locate(event_id) else {
            debug!("no task or instance with that id");
            return Ok(None);
        };

        let mut next = self.tasks.clone();
        let state = next[pos].toggle_instance(index);
        self.commit(next)?;
        info!(index, completed = state, "toggled task");
        Ok(Some(state))
    }

    /// Remove the anchor task `id`, which drops every instance derived from
    /// it. Instance ids are not deletable on their own.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: &str) -> anyhow::Result<Option<Task>> {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            debug!("no anchor task with that id");
            return Ok(None);
        };

        let mut next = self.tasks.clone();
        let removed = next.remove(pos);
        self.commit(next)?;
        info!(instances = removed.instance_count(), "deleted task");
        Ok(Some(removed))
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    fn locate(&self, event_id: &str) -> Option<(usize, u32)> {
        if let Some(pos) = self.tasks.iter().position(|t| t.id == event_id) {
            return Some((pos, 0));
        }
        self.tasks
            .iter()
            .enumerate()
            .find_map(|(pos, t)| t.instance_index(event_id).map(|index| (pos, index)))
    }

    fn commit(&mut self, next: Vec<Task>) -> anyhow::Result<()> {
        let payload = encode_tasks(&next)?;
        self.backend
            .set(&self.key, &payload)
            .with_context(|| format!("failed to persist task record {}", self.key))?;
        self.tasks = next;
        Ok(())
    }
}
