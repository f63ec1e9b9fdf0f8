use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::config::ScoringMode;

#[derive(Debug, Parser)]
#[command(
    name = "ppri",
    version,
    about = "Postpartum depression screening with the EPDS"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file to use instead of the per-user default.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a screening from a JSON answer file and save the result.
    Screen(ScreenArgs),

    /// Work with an exported history file.
    #[command(subcommand)]
    History(HistoryCommand),

    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    /// Answer file: questionnaire answers, EPDS items and clinician summary.
    #[arg(value_name = "ANSWERS")]
    pub answers: PathBuf,

    /// Write the saved record here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Append the saved record to this history file (created if missing).
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Override the configured scoring mode for this run.
    #[arg(long, value_enum)]
    pub scoring: Option<ScoringArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScoringArg {
    Local,
    ScaledEpds,
}

impl From<ScoringArg> for ScoringMode {
    fn from(arg: ScoringArg) -> Self {
        match arg {
            ScoringArg::Local => ScoringMode::Local,
            ScoringArg::ScaledEpds => ScoringMode::ScaledEpds,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List records, newest first.
    List {
        #[arg(value_name = "HISTORY")]
        file: PathBuf,

        /// Case-insensitive match on patient name, plan or notes.
        #[arg(long)]
        search: Option<String>,

        /// all, low, medium or high.
        #[arg(long, default_value = "all")]
        risk: String,
    },

    /// Summary counts and averages.
    Stats {
        #[arg(value_name = "HISTORY")]
        file: PathBuf,
    },

    /// Delete one record.
    Delete {
        #[arg(value_name = "HISTORY")]
        file: PathBuf,

        #[arg(value_name = "ID")]
        id: Uuid,

        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Delete every record.
    Clear {
        #[arg(value_name = "HISTORY")]
        file: PathBuf,

        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Export every record to CSV.
    Export {
        #[arg(value_name = "HISTORY")]
        file: PathBuf,

        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,

    /// Write a new configuration file.
    Init {
        #[arg(long)]
        email: Option<String>,

        /// Defaults to the email address.
        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_enum, default_value = "local")]
        scoring: ScoringArg,

        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}
