// Snapshot persistence for the task collection

use crate::kv::KeyValue;
use crate::task::Task;
use eyre::{Context, Result};
use tracing::{debug, warn};

/// Key holding the serialized task collection
pub const TASKS_KEY: &str = "tasks";

/// Load/save interface injected into the task store
///
/// `save` always receives the full collection and replaces whatever was
/// stored before.
pub trait TaskPersistence {
    fn load(&self) -> Result<Vec<Task>>;

    fn save(&mut self, tasks: &[Task]) -> Result<()>;
}

/// Stores the collection as one JSON array under [`TASKS_KEY`]
#[derive(Debug, Default)]
pub struct KvPersistence<K> {
    kv: K,
}

impl<K: KeyValue> KvPersistence<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }
}

impl<K: KeyValue> TaskPersistence for KvPersistence<K> {
    /// Absent or unparseable data loads as an empty collection
    fn load(&self) -> Result<Vec<Task>> {
        let raw = match self.kv.get(TASKS_KEY)? {
            Some(raw) => raw,
            None => {
                debug!("No stored tasks, starting empty");
                return Ok(Vec::new());
            }
        };

        match serde_json::from_str::<Option<Vec<Task>>>(&raw) {
            Ok(tasks) => {
                let tasks = tasks.unwrap_or_default();
                debug!(count = tasks.len(), "Loaded tasks");
                Ok(tasks)
            }
            Err(e) => {
                warn!(error = ?e, bytes = raw.len(), "Stored tasks are unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks).context("Failed to serialize tasks")?;
        self.kv.set(TASKS_KEY, &json).context("Failed to persist tasks")?;
        debug!(count = tasks.len(), "Persisted tasks");
        Ok(())
    }
}
