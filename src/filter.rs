// Category/priority selectors for the filtered task view

use crate::task::Task;
use std::convert::Infallible;
use std::str::FromStr;

/// Universal-match sentinel (case-sensitive)
pub const ALL: &str = "All";

/// Filter value for one dimension of the view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    /// Matches every task
    #[default]
    All,
    /// Requires exact equality on the field
    Exact(String),
}

impl Selector {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Exact(wanted) => wanted == value,
        }
    }
}

impl FromStr for Selector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Selector::from(s))
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        if s == ALL {
            Selector::All
        } else {
            Selector::Exact(s.to_string())
        }
    }
}

impl From<Option<String>> for Selector {
    fn from(s: Option<String>) -> Self {
        s.as_deref().map(Selector::from).unwrap_or_default()
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::All => write!(f, "{}", ALL),
            Selector::Exact(value) => write!(f, "{}", value),
        }
    }
}

/// Both selectors of the task view, combined with AND
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewFilter {
    pub category: Selector,
    pub priority: Selector,
}

impl ViewFilter {
    pub fn new(category: impl Into<Selector>, priority: impl Into<Selector>) -> Self {
        Self {
            category: category.into(),
            priority: priority.into(),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.category.matches(&task.category) && self.priority.matches(&task.priority)
    }

    /// Stable filter: matching tasks in their input order
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Tasks matching both selectors, input order preserved
pub fn filter_tasks(tasks: &[Task], category: &Selector, priority: &Selector) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| category.matches(&t.category) && priority.matches(&t.priority))
        .cloned()
        .collect()
}
