// TaskPad - task store with filtered views, CSV export, theme preference and focus timer

pub mod app;
pub mod config;
pub mod export;
pub mod filter;
pub mod kv;
pub mod persist;
pub mod render;
pub mod sqlite;
pub mod store;
pub mod task;
pub mod theme;
pub mod timer;
pub mod view;

// Re-export main types for convenience
pub use app::Board;
pub use config::{Backend, Config};
pub use filter::{Selector, ViewFilter, filter_tasks};
pub use kv::{FileKv, KeyValue, MemoryKv, open_backend};
pub use persist::{KvPersistence, TaskPersistence};
pub use render::{Renderer, TerminalRenderer};
pub use sqlite::SqliteKv;
pub use store::{StoreEvent, TaskStore, now_ms};
pub use task::{NewTask, Task, TaskId, TaskPatch};
pub use theme::Theme;
pub use timer::{FocusTimer, Phase};
pub use view::{Counts, compute_counts, distinct_categories, distinct_priorities, due_status};
