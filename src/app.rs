// Callback surface tying the store, the current view filter and a renderer

use crate::filter::{Selector, ViewFilter};
use crate::persist::TaskPersistence;
use crate::render::Renderer;
use crate::store::TaskStore;
use crate::task::{NewTask, Task, TaskId, TaskPatch};
use crate::view::{compute_counts, distinct_categories, distinct_priorities};
use chrono::{Local, NaiveDateTime};
use eyre::Result;
use tracing::debug;

type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// User actions in, recomputed views out
///
/// Each `on_*` callback mutates the store (or the filter) and then pushes the
/// option lists, the counters and the filtered list to the renderer. The
/// filter selection survives mutations.
pub struct Board<P, R> {
    store: TaskStore<P>,
    view: ViewFilter,
    renderer: R,
    clock: Clock,
}

impl<P: TaskPersistence, R: Renderer> Board<P, R> {
    pub fn new(store: TaskStore<P>, renderer: R) -> Self {
        Self {
            store,
            view: ViewFilter::default(),
            renderer,
            clock: local_now,
        }
    }

    /// Replace the clock used for due labels
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &TaskStore<P> {
        &self.store
    }

    pub fn on_create(&mut self, fields: NewTask) -> Result<Task> {
        let task = self.store.create(fields)?;
        self.refresh()?;
        Ok(task)
    }

    pub fn on_edit(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Option<Task>> {
        let task = self.store.update(id, patch)?;
        self.refresh()?;
        Ok(task)
    }

    pub fn on_toggle(&mut self, id: &TaskId) -> Result<Option<Task>> {
        let task = self.store.toggle_complete(id)?;
        self.refresh()?;
        Ok(task)
    }

    pub fn on_delete(&mut self, id: &TaskId) -> Result<bool> {
        let removed = self.store.delete(id)?;
        self.refresh()?;
        Ok(removed)
    }

    /// Select a new category/priority pair and redraw the list
    pub fn on_filter_change(&mut self, category: Selector, priority: Selector) -> Result<()> {
        debug!(%category, %priority, "Filter changed");
        self.view = ViewFilter { category, priority };
        let tasks = self.view.apply(self.store.tasks());
        self.renderer.render_tasks(&tasks, (self.clock)())
    }

    /// Recompute every derived view and push it to the renderer
    pub fn refresh(&mut self) -> Result<()> {
        let tasks = self.store.tasks();
        self.renderer
            .render_options(&distinct_categories(tasks), &distinct_priorities(tasks))?;
        self.renderer.render_counts(&compute_counts(tasks))?;
        let visible = self.view.apply(tasks);
        self.renderer.render_tasks(&visible, (self.clock)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::persist::KvPersistence;
    use crate::view::Counts;
    use chrono::NaiveDate;

    /// Records what the board pushed
    #[derive(Default)]
    struct RecordingRenderer {
        lists: Vec<Vec<String>>,
        counts: Vec<Counts>,
        categories: Vec<Vec<String>>,
    }

    impl Renderer for RecordingRenderer {
        fn render_tasks(&mut self, tasks: &[&Task], _now: NaiveDateTime) -> Result<()> {
            self.lists.push(tasks.iter().map(|t| t.title.clone()).collect());
            Ok(())
        }

        fn render_counts(&mut self, counts: &Counts) -> Result<()> {
            self.counts.push(*counts);
            Ok(())
        }

        fn render_options(&mut self, categories: &[String], _priorities: &[String]) -> Result<()> {
            self.categories.push(categories.to_vec());
            Ok(())
        }
    }

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn board() -> Board<KvPersistence<MemoryKv>, RecordingRenderer> {
        let store = TaskStore::open(KvPersistence::new(MemoryKv::new())).unwrap();
        Board::new(store, RecordingRenderer::default()).with_clock(fixed_now)
    }

    #[test]
    fn test_create_pushes_full_update() {
        let mut board = board();
        board
            .on_create(NewTask::new("A").category("Work").priority("High"))
            .unwrap();

        let r = &board.renderer;
        assert_eq!(r.lists.last().unwrap(), &vec!["A".to_string()]);
        assert_eq!(r.categories.last().unwrap(), &vec!["All".to_string(), "Work".to_string()]);
        assert_eq!(
            r.counts.last().unwrap(),
            &Counts {
                active: 1,
                completed: 0,
                high_priority: 1
            }
        );
    }

    #[test]
    fn test_filter_change_renders_subset_and_sticks() {
        let mut board = board();
        board.on_create(NewTask::new("A").category("Work").priority("High")).unwrap();
        board.on_create(NewTask::new("B").category("Home").priority("High")).unwrap();

        board.on_filter_change(Selector::from("Home"), Selector::All).unwrap();
        assert_eq!(board.renderer.lists.last().unwrap(), &vec!["B".to_string()]);

        board.on_create(NewTask::new("C").category("Home").priority("Low")).unwrap();
        assert_eq!(
            board.renderer.lists.last().unwrap(),
            &vec!["B".to_string(), "C".to_string()]
        );
        assert_eq!(board.view.category, Selector::from("Home"));
    }

    #[test]
    fn test_toggle_edit_delete_callbacks() {
        let mut board = board();
        let task = board.on_create(NewTask::new("A")).unwrap();

        let toggled = board.on_toggle(&task.id).unwrap().unwrap();
        assert!(toggled.completed);
        assert_eq!(board.renderer.counts.last().unwrap().completed, 1);

        let patch = TaskPatch {
            title: Some("A2".to_string()),
            ..Default::default()
        };
        board.on_edit(&task.id, patch).unwrap();
        assert_eq!(board.renderer.lists.last().unwrap(), &vec!["A2".to_string()]);

        assert!(board.on_delete(&task.id).unwrap());
        assert!(board.renderer.lists.last().unwrap().is_empty());
        assert!(!board.on_delete(&task.id).unwrap());
        assert!(board.store().is_empty());
    }

    #[test]
    fn test_missing_id_reports_none() {
        let mut board = board();
        assert!(board.on_toggle(&TaskId::from("ghost")).unwrap().is_none());
        assert!(board.on_edit(&TaskId::from("ghost"), TaskPatch::default()).unwrap().is_none());
    }
}
