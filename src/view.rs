// Derived view data: selector options, aggregate counters and due labels

use crate::filter::ALL;
use crate::task::Task;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Aggregate counters shown next to the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub active: usize,
    pub completed: usize,
    /// Counted regardless of completion state
    pub high_priority: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.active + self.completed
    }
}

pub fn compute_counts(tasks: &[Task]) -> Counts {
    tasks.iter().fold(Counts::default(), |mut counts, task| {
        if task.completed {
            counts.completed += 1;
        } else {
            counts.active += 1;
        }
        if task.is_high_priority() {
            counts.high_priority += 1;
        }
        counts
    })
}

/// `"All"` followed by each category in first-occurrence order
pub fn distinct_categories(tasks: &[Task]) -> Vec<String> {
    distinct_with_all(tasks.iter().map(|t| t.category.as_str()))
}

/// `"All"` followed by each priority in first-occurrence order
pub fn distinct_priorities(tasks: &[Task]) -> Vec<String> {
    distinct_with_all(tasks.iter().map(|t| t.priority.as_str()))
}

fn distinct_with_all<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut options = vec![ALL.to_string()];
    for value in values {
        if seen.insert(value) {
            options.push(value.to_string());
        }
    }
    options
}

/// Whole days until `due`, rounded up
///
/// The due date counts from its midnight, so anything due earlier today
/// rounds up to zero.
pub fn days_until(due: NaiveDate, now: NaiveDateTime) -> i64 {
    let diff = (due.and_time(chrono::NaiveTime::MIN) - now).num_milliseconds();
    let days = diff / MS_PER_DAY;
    if diff % MS_PER_DAY > 0 { days + 1 } else { days }
}

/// Human label for the time left until `due`
pub fn due_status(due: NaiveDate, now: NaiveDateTime) -> String {
    match days_until(due, now) {
        d if d < 0 => "Overdue".to_string(),
        0 => "Today".to_string(),
        1 => "1 day".to_string(),
        d => format!("{} days", d),
    }
}

/// Due label for a task, `None` when it has no due date
pub fn task_due_status(task: &Task, now: NaiveDateTime) -> Option<String> {
    task.due_date.map(|due| due_status(due, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, TaskId};
    use chrono::{Duration, Utc};

    fn task(n: u32, category: &str, priority: &str, completed: bool) -> Task {
        let mut t = NewTask::new(format!("Task {}", n))
            .category(category)
            .priority(priority)
            .into_task(TaskId::from(format!("t{}", n)), Utc::now());
        t.completed = completed;
        t
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn test_counts() {
        let tasks = vec![
            task(1, "Work", "High", false),
            task(2, "Work", "High", true),
            task(3, "Home", "Low", false),
        ];
        let counts = compute_counts(&tasks);
        assert_eq!(
            counts,
            Counts {
                active: 2,
                completed: 1,
                high_priority: 2
            }
        );
        assert_eq!(counts.total(), tasks.len());
    }

    #[test]
    fn test_counts_empty() {
        assert_eq!(compute_counts(&[]), Counts::default());
    }

    #[test]
    fn test_distinct_options_first_occurrence_order() {
        let tasks = vec![
            task(1, "Work", "High", false),
            task(2, "Home", "Low", false),
            task(3, "Work", "Medium", false),
            task(4, "Study", "Low", false),
        ];
        assert_eq!(distinct_categories(&tasks), vec!["All", "Work", "Home", "Study"]);
        assert_eq!(distinct_priorities(&tasks), vec!["All", "High", "Low", "Medium"]);
    }

    #[test]
    fn test_distinct_options_empty_collection() {
        assert_eq!(distinct_categories(&[]), vec!["All"]);
        assert_eq!(distinct_priorities(&[]), vec!["All"]);
    }

    #[test]
    fn test_due_status_at_midnight() {
        let now = today().and_time(chrono::NaiveTime::MIN);
        assert_eq!(due_status(today(), now), "Today");
        assert_eq!(due_status(today() - Duration::days(3), now), "Overdue");
        assert_eq!(due_status(today() + Duration::days(1), now), "1 day");
        assert_eq!(due_status(today() + Duration::days(5), now), "5 days");
    }

    #[test]
    fn test_due_status_during_the_day() {
        let now = today().and_hms_opt(15, 30, 0).unwrap();
        assert_eq!(due_status(today(), now), "Today");
        assert_eq!(due_status(today() - Duration::days(1), now), "Overdue");
        assert_eq!(due_status(today() + Duration::days(1), now), "1 day");
        assert_eq!(due_status(today() + Duration::days(5), now), "5 days");
    }

    #[test]
    fn test_days_until_rounds_up() {
        let now = today().and_hms_opt(0, 0, 1).unwrap();
        assert_eq!(days_until(today() + Duration::days(2), now), 2);
        assert_eq!(days_until(today(), now), 0);
        assert_eq!(days_until(today() - Duration::days(1), now), -1);
    }

    #[test]
    fn test_task_without_due_date_has_no_status() {
        let t = task(1, "Work", "Low", false);
        let now = today().and_time(chrono::NaiveTime::MIN);
        assert_eq!(task_due_status(&t, now), None);
    }
}
