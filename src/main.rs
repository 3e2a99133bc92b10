use chrono::{Local, NaiveDate};
use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Parser, Subcommand};
use eyre::{Result, eyre};
use std::io::{Stdout, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use taskpad::config::{TimerConfig, default_base_path, open_store_dir};
use taskpad::export::export_csv;
use taskpad::render::short_id;
use taskpad::task::PRIORITIES;
use taskpad::{
    Board, Config, FocusTimer, KeyValue, KvPersistence, NewTask, Renderer, Selector, StoreEvent, TaskId, TaskPatch,
    TaskStore, TerminalRenderer, compute_counts, distinct_categories, distinct_priorities, open_backend, theme,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "taskpad")]
#[command(about = "TaskPad CLI - track, filter and export tasks, with a focus timer")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the store directory (default: platform data directory)
    #[arg(short, long, global = true)]
    store_path: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "General")]
        category: String,
        #[arg(short, long, default_value = "Medium", value_parser = PossibleValuesParser::new(PRIORITIES))]
        priority: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Change fields of a task; omitted fields keep their value
    Edit {
        /// Task id or unique id prefix
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_parser = PossibleValuesParser::new(PRIORITIES))]
        priority: Option<String>,
        /// New due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Mark a task completed, or active again
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task id or unique id prefix
        id: String,
    },

    /// List tasks, optionally filtered
    List {
        /// Category to show ("All" for every category)
        #[arg(short, long, default_value = "All")]
        category: Selector,
        /// Priority to show ("All" for every priority)
        #[arg(short, long, default_value = "All")]
        priority: Selector,
    },

    /// Show active, completed and high-priority counts
    Stats,

    /// Show the categories and priorities in use
    Options,

    /// Export all tasks to a CSV file
    Export {
        /// Output directory (default: config export_dir, else current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show or toggle the light/dark theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Run the focus/break countdown
    Timer {
        /// Preset name from the config
        #[arg(long, conflicts_with_all = ["work", "break_minutes"])]
        preset: Option<String>,
        /// Focus length in minutes
        #[arg(long)]
        work: Option<u32>,
        /// Break length in minutes
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Number of phase changes before exiting
        #[arg(long, default_value_t = 1)]
        cycles: u32,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum ThemeAction {
    Show,
    Toggle,
}

type CliBoard = Board<KvPersistence<Box<dyn KeyValue>>, TerminalRenderer<Stdout>>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let base_path = cli.store_path.unwrap_or_else(default_base_path);
    let store_dir = open_store_dir(&base_path)?;
    let config = Config::load(&store_dir)?;

    match cli.command {
        Commands::Add {
            title,
            description,
            category,
            priority,
            due,
        } => {
            let mut fields = NewTask::new(title)
                .description(description)
                .category(category)
                .priority(priority);
            fields.due_date = due;
            open_board(&config, &store_dir)?.on_create(fields)?;
        }
        Commands::Edit {
            id,
            title,
            description,
            category,
            priority,
            due,
            clear_due,
        } => {
            let patch = TaskPatch {
                title,
                description,
                category,
                priority,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };
            if patch.is_empty() {
                return Err(eyre!("Nothing to change, pass at least one field"));
            }
            let mut board = open_board(&config, &store_dir)?;
            let task_id = resolve_id(board.store(), &id)?;
            if board.on_edit(&task_id, patch)?.is_none() {
                not_found(&id);
            }
        }
        Commands::Toggle { id } => {
            let mut board = open_board(&config, &store_dir)?;
            let task_id = resolve_id(board.store(), &id)?;
            if board.on_toggle(&task_id)?.is_none() {
                not_found(&id);
            }
        }
        Commands::Delete { id } => {
            let mut board = open_board(&config, &store_dir)?;
            let task_id = resolve_id(board.store(), &id)?;
            if !board.on_delete(&task_id)? {
                not_found(&id);
            }
        }
        Commands::List { category, priority } => {
            open_board(&config, &store_dir)?.on_filter_change(category, priority)?;
        }
        Commands::Stats => {
            let store = open_store(&config, &store_dir)?;
            TerminalRenderer::stdout().render_counts(&compute_counts(store.tasks()))?;
        }
        Commands::Options => {
            let store = open_store(&config, &store_dir)?;
            let tasks = store.tasks();
            TerminalRenderer::stdout().render_options(&distinct_categories(tasks), &distinct_priorities(tasks))?;
        }
        Commands::Export { out } => {
            let store = open_store(&config, &store_dir)?;
            let dir = out
                .or_else(|| config.export_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            match export_csv(store.tasks(), &dir, Local::now().date_naive())? {
                Some(path) => println!("Exported {} tasks to {}", store.len(), path.display()),
                None => println!("No tasks to export"),
            }
        }
        Commands::Theme { action } => run_theme(action.unwrap_or(ThemeAction::Show), &config, &store_dir)?,
        Commands::Timer {
            preset,
            work,
            break_minutes,
            cycles,
        } => {
            let timer = build_timer(&config.timer, preset.as_deref(), work, break_minutes)?;
            run_timer(timer, cycles)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &Config, store_dir: &Path) -> Result<TaskStore<KvPersistence<Box<dyn KeyValue>>>> {
    let kv = open_backend(config.backend, store_dir)?;
    TaskStore::open(KvPersistence::new(kv))
}

/// Store with change notices printed, wired to a stdout renderer
fn open_board(config: &Config, store_dir: &Path) -> Result<CliBoard> {
    let mut store = open_store(config, store_dir)?;
    store.subscribe(|event| match event {
        StoreEvent::Created(task) => println!("Created {} {}", short_id(task), task.title),
        StoreEvent::Updated(task) => println!("Updated {} {}", short_id(task), task.title),
        StoreEvent::Toggled(task) if task.completed => println!("Completed {} {}", short_id(task), task.title),
        StoreEvent::Toggled(task) => println!("Reopened {} {}", short_id(task), task.title),
        StoreEvent::Deleted(id) => println!("Deleted {}", id),
    });
    Ok(Board::new(store, TerminalRenderer::stdout()))
}

/// Map user input to a stored id; unknown input is passed through so the
/// store reports it as missing
fn resolve_id<P: taskpad::TaskPersistence>(store: &TaskStore<P>, raw: &str) -> Result<TaskId> {
    Ok(store.resolve(raw)?.unwrap_or_else(|| TaskId::from(raw.trim())))
}

fn not_found(id: &str) {
    eprintln!("No task matches '{}'", id);
}

fn run_theme(action: ThemeAction, config: &Config, store_dir: &Path) -> Result<()> {
    let mut kv: Box<dyn KeyValue> = open_backend(config.backend, store_dir)?;
    let current = match action {
        ThemeAction::Show => theme::load_theme(&kv)?,
        ThemeAction::Toggle => theme::toggle_theme(&mut kv)?,
    };
    println!("{}", current.label());
    Ok(())
}

fn build_timer(
    config: &TimerConfig,
    preset: Option<&str>,
    work: Option<u32>,
    break_minutes: Option<u32>,
) -> Result<FocusTimer> {
    let (work, break_minutes) = match preset {
        Some(name) => {
            let preset = config
                .preset(name)
                .ok_or_else(|| eyre!("Unknown timer preset: {}", name))?;
            (preset.work_minutes, preset.break_minutes)
        }
        None => (
            work.unwrap_or(config.work_minutes),
            break_minutes.unwrap_or(config.break_minutes),
        ),
    };
    FocusTimer::new(work, break_minutes)
}

fn run_timer(mut timer: FocusTimer, cycles: u32) -> Result<()> {
    let mut stdout = std::io::stdout();
    let mut changes = 0;

    timer.start();
    write!(stdout, "\r{:<6} {}", timer.phase(), timer.display())?;
    stdout.flush()?;

    while changes < cycles {
        thread::sleep(Duration::from_secs(1));
        if let Some(phase) = timer.tick() {
            changes += 1;
            writeln!(stdout, "\x07")?;
            writeln!(stdout, "{} started", phase)?;
        }
        write!(stdout, "\r{:<6} {}", timer.phase(), timer.display())?;
        stdout.flush()?;
    }

    writeln!(stdout)?;
    Ok(())
}
