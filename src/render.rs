// Rendering contract and the terminal renderer

use crate::task::Task;
use crate::view::{Counts, task_due_status};
use chrono::NaiveDateTime;
use colored::{ColoredString, Colorize};
use eyre::Result;
use std::io::Write;

/// Length of the id prefix shown in listings
pub const SHORT_ID_LEN: usize = 8;

/// Receives recomputed view data after every change
pub trait Renderer {
    /// Redraw the list with the (already filtered) tasks
    fn render_tasks(&mut self, tasks: &[&Task], now: NaiveDateTime) -> Result<()>;

    /// Redraw the aggregate counters
    fn render_counts(&mut self, counts: &Counts) -> Result<()>;

    /// Redraw the selector option lists
    fn render_options(&mut self, categories: &[String], priorities: &[String]) -> Result<()>;
}

/// Plain-text renderer for terminals, colored when the output supports it
pub struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

pub fn short_id(task: &Task) -> &str {
    let id = task.id.as_str();
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn priority_colored(priority: &str) -> ColoredString {
    match priority {
        "High" => priority.red().bold(),
        "Medium" => priority.yellow(),
        "Low" => priority.green(),
        other => other.normal(),
    }
}

fn due_colored(task: &Task, now: NaiveDateTime) -> ColoredString {
    match task_due_status(task, now) {
        None => "No due date".dimmed(),
        Some(label) if label == "Overdue" => {
            if task.completed {
                label.as_str().normal()
            } else {
                label.as_str().red()
            }
        }
        Some(label) if label == "Today" => label.as_str().normal(),
        Some(label) => format!("Due in {}", label).as_str().normal(),
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_tasks(&mut self, tasks: &[&Task], now: NaiveDateTime) -> Result<()> {
        if tasks.is_empty() {
            writeln!(self.out, "{}", "No tasks".dimmed())?;
            return Ok(());
        }

        for task in tasks {
            let (mark, title) = if task.completed {
                ("[x]", task.title.as_str().dimmed().strikethrough())
            } else {
                ("[ ]", task.title.as_str().bold())
            };
            writeln!(
                self.out,
                "{} {}  {}  ({} / {})  {}",
                mark,
                short_id(task).cyan(),
                title,
                task.category,
                priority_colored(&task.priority),
                due_colored(task, now)
            )?;
            if !task.description.is_empty() {
                writeln!(self.out, "      {}", task.description)?;
            }
        }
        Ok(())
    }

    fn render_counts(&mut self, counts: &Counts) -> Result<()> {
        writeln!(
            self.out,
            "Total: {}  Active: {}  Completed: {}  High priority: {}",
            counts.total().to_string().as_str().bold(),
            counts.active.to_string().as_str().bold(),
            counts.completed.to_string().as_str().bold(),
            counts.high_priority.to_string().as_str().red().bold()
        )?;
        Ok(())
    }

    fn render_options(&mut self, categories: &[String], priorities: &[String]) -> Result<()> {
        writeln!(self.out, "Categories: {}", categories.join(", "))?;
        writeln!(self.out, "Priorities: {}", priorities.join(", "))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, TaskId};
    use chrono::{NaiveDate, Utc};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    fn render(tasks: &[&Task]) -> String {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render_tasks(tasks, now()).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_render_empty_list() {
        assert!(render(&[]).contains("No tasks"));
    }

    #[test]
    fn test_render_task_line() {
        let task = NewTask::new("Write report")
            .description("Quarterly numbers")
            .category("Work")
            .priority("High")
            .due(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
            .into_task(TaskId::from("0191abcdef-1234"), Utc::now());

        let out = render(&[&task]);
        assert!(out.contains("[ ]"));
        assert!(out.contains("0191abcd"));
        assert!(!out.contains("0191abcde"));
        assert!(out.contains("Write report"));
        assert!(out.contains("Due in 5 days"));
        assert!(out.contains("Quarterly numbers"));
    }

    #[test]
    fn test_render_completed_and_undated() {
        let mut task = NewTask::new("Done thing").into_task(TaskId::from("42"), Utc::now());
        task.completed = true;

        let out = render(&[&task]);
        assert!(out.contains("[x]"));
        assert!(out.contains("42"));
        assert!(out.contains("No due date"));
    }

    #[test]
    fn test_render_overdue_and_today_without_prefix() {
        let mut overdue = NewTask::new("Late")
            .due(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .into_task(TaskId::from("1"), Utc::now());
        overdue.completed = true;
        let today = NewTask::new("Now")
            .due(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
            .into_task(TaskId::from("2"), Utc::now());

        let out = render(&[&overdue, &today]);
        assert!(out.contains("Overdue"));
        assert!(out.contains("Today"));
        assert!(!out.contains("Due in Overdue"));
        assert!(!out.contains("Due in Today"));
    }

    #[test]
    fn test_render_counts_and_options() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer
            .render_counts(&Counts {
                active: 3,
                completed: 1,
                high_priority: 2,
            })
            .unwrap();
        renderer
            .render_options(&["All".to_string(), "Work".to_string()], &["All".to_string()])
            .unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.contains("Total: "));
        assert!(out.contains("4"));
        assert!(out.contains("Active: "));
        assert!(out.contains("High priority: "));
        assert!(out.contains("Categories: All, Work"));
        assert!(out.contains("Priorities: All"));
    }
}
