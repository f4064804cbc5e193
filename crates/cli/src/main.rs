// periodgrid CLI - monthly period tables from the shell
// Every command reads a JSON grid state file, applies one action and writes it back.

mod exit_codes;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use periodgrid_cli::render::render_grid;
use periodgrid_cli::session::Session;
use periodgrid_cli::state_file::{self, StateFileError};
use periodgrid_cli::verdict::Verdict;
use periodgrid_cli::cell_ref;
use periodgrid_config::{ConfigError, Settings};
use periodgrid_engine::{actions, Action, ActionOutcome, Grid, GridState};
use periodgrid_protocol::PROTOCOL_VERSION;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_STATE_PARSE, EXIT_SUBMIT_INVALID, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "pgrid")]
#[command(about = "Monthly period tables: span validation and quarter averages")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/periodgrid/settings.toml)
    #[arg(long, global = true, env = "PGRID_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new grid state file
    #[command(after_help = "\
Examples:
  pgrid new grid.json
  pgrid new grid.json --year 2024 --tables 2 --rows 3")]
    New {
        /// State file to create
        file: PathBuf,

        /// Year of the first row (default: grid.base_year setting, else the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Number of tables
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        tables: u16,

        /// Rows per table; each extra row is one year earlier
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        rows: u16,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Append a row (one year earlier) to every table
    AddRow {
        file: PathBuf,
    },

    /// Append a table with the same years and no values
    AddTable {
        file: PathBuf,
    },

    /// Enter one value; an empty value clears the cell
    #[command(after_help = "\
Cells are addressed as TABLE:ROW:MONTH (1-based table and row).
Examples:
  pgrid set grid.json 1:1:jan 12.5
  pgrid set grid.json 2:1:7 4
  pgrid set grid.json 1:2:mar ''")]
    Set {
        file: PathBuf,

        /// Cell reference, e.g. 1:1:jan
        cell: String,

        /// Value to store
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Validate the grid and compute quarter and year-to-date averages
    #[command(after_help = "\
Exit codes:
  0   valid, averages written to the state file
  10  invalid, every offending cell is listed")]
    Submit {
        file: PathBuf,

        /// Print the outcome as one JSON object
        #[arg(long)]
        json: bool,
    },

    /// Print the grid
    Show {
        file: PathBuf,

        /// Print the raw state JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit over JSONL on stdin/stdout (one reply per message)
    #[command(after_help = "\
Messages:
  {\"type\":\"add_row\",\"id\":\"1\"}
  {\"type\":\"add_table\",\"id\":\"2\"}
  {\"type\":\"set_cell\",\"id\":\"3\",\"table\":0,\"row\":0,\"column\":0,\"value\":\"12\"}
  {\"type\":\"submit\",\"id\":\"4\"}
  {\"type\":\"snapshot\",\"id\":\"5\"}")]
    Session {
        /// Start from this state file and write the final state back to it
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        format!(
            "{} ({})\nengine:  periodgrid-engine {}\ntarget:  {}\nprotocol_version(session): {}",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_COMMIT_HASH"),
            env!("CARGO_PKG_VERSION"),
            env!("TARGET"),
            PROTOCOL_VERSION,
        )
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = load_settings(cli.config.as_deref()).and_then(|settings| match cli.command {
        Commands::New { file, year, tables, rows, force } => {
            cmd_new(&settings, file, year, tables as usize, rows as usize, force)
        }
        Commands::AddRow { file } => cmd_action(&file, Action::AddRow),
        Commands::AddTable { file } => cmd_action(&file, Action::AddTable),
        Commands::Set { file, cell, value } => cmd_set(&file, &cell, value),
        Commands::Submit { file, json } => cmd_submit(&settings, &file, json),
        Commands::Show { file, json } => cmd_show(&settings, &file, json),
        Commands::Session { state } => cmd_session(&settings, state),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_STATE_PARSE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Submission rejected. The errors were already printed.
    pub fn invalid() -> Self {
        Self { code: EXIT_SUBMIT_INVALID, message: String::new(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<StateFileError> for CliError {
    fn from(err: StateFileError) -> Self {
        match err {
            StateFileError::Parse { .. } => CliError::parse(err.to_string())
                .with_hint("state files are written by `pgrid new`; do not edit them by hand"),
            StateFileError::Exists(_) => CliError::args(err.to_string()).with_hint("pass --force to overwrite"),
            StateFileError::Read { .. } | StateFileError::Write { .. } => CliError::io(err.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::args(err.to_string())
    }
}

// ============================================================================
// setup
// ============================================================================

/// Settings first, then logging, so the filter setting applies.
fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let (settings, fallback) = match path {
        Some(path) => (Settings::load_from(path)?, None),
        None => match Settings::load_default() {
            Ok(settings) => (settings, None),
            Err(err) => (Settings::default(), Some(err)),
        },
    };

    init_logging(&settings.log.filter);
    if let Some(err) = fallback {
        log::warn!("{}; using default settings", err);
    }
    Ok(settings)
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

// ============================================================================
// commands
// ============================================================================

fn cmd_new(
    settings: &Settings,
    file: PathBuf,
    year: Option<i32>,
    tables: usize,
    rows: usize,
    force: bool,
) -> Result<(), CliError> {
    let mut state = Grid::new(year.unwrap_or_else(|| settings.base_year()));
    for _ in 1..rows {
        state.add_row();
    }
    for _ in 1..tables {
        state.add_table();
    }

    state_file::create(&file, &state, force)?;
    println!(
        "created {} ({} tables, years {})",
        file.display(),
        state.table_count(),
        year_range(&state)
    );
    Ok(())
}

fn cmd_action(file: &Path, action: Action) -> Result<(), CliError> {
    let outcome = apply_to_file(file, action)?;
    println!(
        "{} tables x {} rows (years {}), {} of {} cells filled",
        outcome.state.table_count(),
        outcome.state.row_count(),
        year_range(&outcome.state),
        outcome.state.filled_count(),
        outcome.state.cell_count()
    );
    Ok(())
}

fn cmd_set(file: &Path, cell: &str, value: String) -> Result<(), CliError> {
    let pos = cell_ref::parse(cell).map_err(|e| CliError::args(e.to_string()))?;
    let outcome = apply_to_file(file, Action::SetCell { pos, input: value })?;

    match outcome.state.cell(pos).map(|v| v.raw_display()) {
        Some(shown) if !shown.is_empty() => println!("{} = {}", pos, shown),
        _ => println!("{} cleared", pos),
    }
    Ok(())
}

fn cmd_submit(settings: &Settings, file: &Path, json: bool) -> Result<(), CliError> {
    let outcome = apply_to_file(file, Action::Submit)?;
    let verdict = Verdict::from_status(&outcome.status, &settings.messages);

    if json {
        let text = serde_json::to_string(&verdict).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    } else if verdict.is_valid() {
        println!("{}", verdict.message);
        print!("{}", render_grid(&outcome.state, &settings.table.caption));
    } else {
        println!("{}", verdict.message);
        for (entry, error) in verdict.errors.iter().zip(outcome.status.errors()) {
            match entry.key {
                Some(_) => println!("  {}  {}", error, entry.message),
                None => println!("  {}", entry.message),
            }
        }
    }

    if verdict.is_valid() {
        Ok(())
    } else {
        Err(CliError::invalid())
    }
}

fn cmd_show(settings: &Settings, file: &Path, json: bool) -> Result<(), CliError> {
    let state = state_file::load(file)?;
    if json {
        let text = serde_json::to_string_pretty(&state).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", render_grid(&state, &settings.table.caption));
    }
    Ok(())
}

fn cmd_session(settings: &Settings, state_path: Option<PathBuf>) -> Result<(), CliError> {
    let state = match &state_path {
        Some(path) if path.exists() => state_file::load(path)?,
        _ => Grid::new(settings.base_year()),
    };

    let mut session = Session::new(state, settings.messages.clone());
    let stdin = io::stdin();
    let stdout = io::stdout();
    let served = session.run(stdin.lock(), stdout.lock());

    // Keep the edits made so far even if the stream broke.
    if let Some(path) = state_path {
        state_file::save(&path, session.state())?;
    }
    served.map_err(|e| CliError::io(format!("session: {}", e)))?;
    io::stdout().flush().map_err(|e| CliError::io(e.to_string()))?;
    Ok(())
}

// ============================================================================
// helpers
// ============================================================================

/// Load, apply, save. A rejected action leaves the file untouched.
fn apply_to_file(file: &Path, action: Action) -> Result<ActionOutcome, CliError> {
    let state = state_file::load(file)?;
    let outcome = actions::apply(state, action).map_err(|e| CliError::args(e.to_string()))?;
    state_file::save(file, &outcome.state)?;
    Ok(outcome)
}

fn year_range(state: &GridState) -> String {
    let years = state.years();
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => format!("{}-{}", last, first),
        (Some(first), _) => first.to_string(),
        _ => String::new(),
    }
}
