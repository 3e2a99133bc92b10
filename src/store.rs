// Task store: the ordered task collection and its durable mirror

use crate::persist::TaskPersistence;
use crate::task::{NewTask, Task, TaskId, TaskPatch};
use chrono::Utc;
use eyre::{Result, eyre};
use tracing::{debug, info};

/// Change notifications delivered to subscribers after each persisted mutation
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Created(Task),
    Updated(Task),
    Toggled(Task),
    Deleted(TaskId),
}

type Observer = Box<dyn FnMut(&StoreEvent)>;

/// Owns the authoritative task collection
///
/// Insertion order is display order. Every mutation rewrites the full
/// collection through the injected [`TaskPersistence`] before returning.
pub struct TaskStore<P> {
    tasks: Vec<Task>,
    persistence: P,
    observers: Vec<Observer>,
}

impl<P: TaskPersistence> TaskStore<P> {
    /// Load the persisted collection and wrap it in a store
    pub fn open(persistence: P) -> Result<Self> {
        let tasks = persistence.load()?;
        info!(count = tasks.len(), "Opened task store");
        Ok(Self {
            tasks,
            persistence,
            observers: Vec::new(),
        })
    }

    /// All tasks in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Register a callback invoked after every successful mutation
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Resolve a full id or a unique id prefix
    ///
    /// Returns `None` when nothing matches and an error when the prefix is
    /// ambiguous.
    pub fn resolve(&self, prefix: &str) -> Result<Option<TaskId>> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(None);
        }
        if let Some(task) = self.tasks.iter().find(|t| t.id.as_str() == prefix) {
            return Ok(Some(task.id.clone()));
        }

        let mut matches = self.tasks.iter().filter(|t| t.id.as_str().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(task), None) => Ok(Some(task.id.clone())),
            (Some(_), Some(_)) => Err(eyre!("Ambiguous task id prefix: {}", prefix)),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new task with a fresh id, `completed = false` and the current time
    pub fn create(&mut self, fields: NewTask) -> Result<Task> {
        let mut id = TaskId::generate();
        while self.get(&id).is_some() {
            id = TaskId::generate();
        }

        let task = fields.into_task(id, Utc::now());
        self.tasks.push(task.clone());
        self.persist()?;

        debug!(id = %task.id, title = %task.title, "Created task");
        self.notify(StoreEvent::Created(task.clone()));
        Ok(task)
    }

    /// Merge `patch` over the task with `id`
    ///
    /// Returns `None` without touching storage when no such task exists.
    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Option<Task>> {
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            debug!(%id, "update: task not found");
            return Ok(None);
        };

        patch.apply(task);
        let task = task.clone();
        self.persist()?;

        debug!(%id, "Updated task");
        self.notify(StoreEvent::Updated(task.clone()));
        Ok(Some(task))
    }

    /// Flip `completed` on the task with `id`
    pub fn toggle_complete(&mut self, id: &TaskId) -> Result<Option<Task>> {
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            debug!(%id, "toggle_complete: task not found");
            return Ok(None);
        };

        task.completed = !task.completed;
        let task = task.clone();
        self.persist()?;

        debug!(%id, completed = task.completed, "Toggled task");
        self.notify(StoreEvent::Toggled(task.clone()));
        Ok(Some(task))
    }

    /// Remove the task with `id`, returning whether one was removed
    ///
    /// The remaining collection is persisted either way.
    pub fn delete(&mut self, id: &TaskId) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        let removed = self.tasks.len() != before;
        self.persist()?;

        if removed {
            debug!(%id, "Deleted task");
            self.notify(StoreEvent::Deleted(id.clone()));
        } else {
            debug!(%id, "delete: task not found");
        }
        Ok(removed)
    }

    /// Write the full in-memory collection to storage
    pub fn persist(&mut self) -> Result<()> {
        self.persistence.save(&self.tasks)
    }

    fn notify(&mut self, event: StoreEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
