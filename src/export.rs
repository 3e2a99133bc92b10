// CSV export of the task collection

use crate::task::Task;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use eyre::{Context, Result, eyre};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Header row of every export
pub const HEADERS: [&str; 6] = ["Title", "Description", "Category", "Priority", "Due Date", "Status"];

/// Byte-order mark so spreadsheet apps detect UTF-8
const BOM: &str = "\u{feff}";

pub fn status_label(task: &Task) -> &'static str {
    if task.completed { "Completed" } else { "Pending" }
}

/// Write the header and one record per task to `out`
///
/// Fields are quoted only when they contain a comma, quote or line break;
/// embedded quotes are doubled. Records end with `\n`.
fn write_csv<W: Write>(out: W, tasks: &[Task]) -> Result<W> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    wtr.write_record(HEADERS)?;
    for task in tasks {
        let due = task.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        wtr.write_record([
            task.title.as_str(),
            task.description.as_str(),
            task.category.as_str(),
            task.priority.as_str(),
            due.as_str(),
            status_label(task),
        ])?;
    }

    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| eyre!("Failed to finish CSV output: {}", e.error()))
}

/// Render the whole collection, BOM and header first
pub fn to_csv(tasks: &[Task]) -> Result<String> {
    let buf = write_csv(BOM.as_bytes().to_vec(), tasks)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// File name used for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("tasks_{}.csv", date.format("%Y-%m-%d"))
}

/// Write `tasks_<date>.csv` into `dir`
///
/// Returns `None` and writes nothing when there are no tasks.
pub fn export_csv(tasks: &[Task], dir: &Path, date: NaiveDate) -> Result<Option<PathBuf>> {
    if tasks.is_empty() {
        info!("No tasks to export");
        return Ok(None);
    }

    fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory {:?}", dir))?;
    let path = dir.join(export_file_name(date));
    fs::write(&path, to_csv(tasks)?).with_context(|| format!("Failed to write {:?}", path))?;

    info!(file = ?path, count = tasks.len(), "Exported tasks");
    Ok(Some(path))
}
