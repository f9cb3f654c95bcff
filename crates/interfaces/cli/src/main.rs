mod memory_cmds;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memkit_config::{AppConfig, DEFAULT_CONFIG_PATH};
use memkit_memory::{MemoryManager, RecallOptions};

#[derive(Debug, Parser)]
#[command(
    name = "memkit",
    version,
    about = "File-based, human-readable memory for software agents"
)]
struct Cli {
    /// Memory directory (overrides `memory.base_dir` and `MEMKIT_DIR`).
    #[arg(long, global = true, value_name = "PATH")]
    dir: Option<PathBuf>,
    /// Config file to read.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Store or update a fact.
    Remember {
        key: String,
        value: String,
        #[arg(short, long, default_value = "general")]
        category: String,
    },
    /// Search stored facts by keyword and fuzzy similarity.
    Recall {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Remove a fact.
    Forget {
        key: String,
        #[arg(short, long, default_value = "general")]
        category: String,
    },
    /// Show the entries of one category, oldest first.
    List {
        #[arg(short, long, default_value = "general")]
        category: String,
        #[arg(long)]
        json: bool,
    },
    /// List category names.
    Categories,
    /// Entry counts per category.
    Stats,
    /// Drop the oldest entries of every category above the limit.
    Trim {
        /// Entries to keep per category (defaults to `memory.max_per_category`).
        #[arg(long)]
        max: Option<usize>,
        #[arg(long)]
        yes: bool,
    },
    /// Append a note to a daily log.
    Log {
        text: String,
        /// Log date as YYYY-MM-DD (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the notes of a daily log.
    LogShow {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    if let Some(dir) = &cli.dir {
        config.memory.base_dir = dir.to_string_lossy().to_string();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut memory = MemoryManager::from_config(&config.memory)
        .with_context(|| format!("opening memory at {}", config.memory.base_dir))?;

    match cli.command {
        Commands::Remember { key, value, category } => {
            memory_cmds::run_remember(&mut memory, &key, &value, &category)?;
        }
        Commands::Recall {
            query,
            limit,
            threshold,
            json,
        } => {
            let defaults = RecallOptions::from(&config.recall);
            let options = RecallOptions::new(
                limit.unwrap_or(defaults.limit),
                threshold.unwrap_or(defaults.threshold),
            );
            memory_cmds::run_recall(&memory, &query, options, json)?;
        }
        Commands::Forget { key, category } => {
            memory_cmds::run_forget(&mut memory, &key, &category)?;
        }
        Commands::List { category, json } => {
            memory_cmds::run_list(&memory, &category, json)?;
        }
        Commands::Categories => memory_cmds::run_categories(&memory),
        Commands::Stats => memory_cmds::run_stats(&memory),
        Commands::Trim { max, yes } => {
            let max = max.unwrap_or(config.memory.max_per_category);
            memory_cmds::run_trim(&mut memory, max, yes)?;
        }
        Commands::Log { text, date } => {
            memory_cmds::run_log(&mut memory, &text, date)?;
        }
        Commands::LogShow { date } => {
            memory_cmds::run_log_show(&memory, date)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn remember_defaults_to_general_category() {
        let cli = Cli::parse_from(["memkit", "remember", "k", "v"]);
        match cli.command {
            Commands::Remember { category, .. } => assert_eq!(category, "general"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn log_date_parses_iso_format() {
        let cli = Cli::parse_from(["memkit", "--dir", "/tmp/m", "log", "hello", "--date", "2026-02-18"]);
        match cli.command {
            Commands::Log { date, .. } => {
                assert_eq!(date.map(|d| d.to_string()).as_deref(), Some("2026-02-18"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["memkit", "log", "x", "--date", "../etc"]).is_err());
    }
}
