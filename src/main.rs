//! Mauka Trie - benchmark and demo driver.
//!
//! Times the Niihau Trie against a hash map and runs fuzzy searches over a
//! word list. Configuration comes from defaults, an optional file and
//! `MAUKA_TRIE__*` environment variables; command-line flags override both.

use clap::{Parser, Subcommand};
use mauka_trie_lib::bench;
use mauka_trie_lib::config::{self, ConfigLoader, LogConfig, MaukaConfig, Validate};
use mauka_trie_lib::error::{ErrorContext, ErrorReporter, MaukaError, MaukaResult, TracingErrorReporter};
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line arguments for Mauka Trie.
#[derive(Parser, Debug)]
#[clap(name = "Mauka Trie", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Print reports as JSON
    #[clap(long, global = true)]
    json: bool,

    /// Command to execute
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Time bulk inserts and lookups in the trie and in a hash map
    Compare {
        /// Number of generated keys
        #[clap(short = 'n', long)]
        count: Option<usize>,
    },

    /// Load a word list and run a fuzzy search over it
    Search {
        /// Word to search for
        #[clap(short, long)]
        word: Option<String>,

        /// Maximum edit distance
        #[clap(short, long)]
        distance: Option<usize>,

        /// Word-per-line dictionary file
        #[clap(long, value_parser)]
        dictionary: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Initialize the logging system. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(log: &LogConfig) -> MaukaResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(log.source_location)
        .with_line_number(log.source_location)
        .with_writer(std::io::stderr);

    let result = if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.pretty().finish())
    };
    result.map_err(|e| MaukaError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

fn print_report<T: Serialize + Display>(report: &T, json: bool) -> MaukaResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn gen_config(output: &Path) -> MaukaResult<()> {
    info!("Generating default configuration");
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml = toml::to_string_pretty(&MaukaConfig::default())?;
    std::fs::write(output, toml)?;
    info!("Default configuration written to {:?}", output);
    Ok(())
}

fn compare(mut config: MaukaConfig, count: Option<usize>, json: bool) -> MaukaResult<()> {
    if let Some(count) = count {
        config.bench.item_count = count;
    }
    config.validate()?;

    let reports = bench::run_compare(&config.bench, &config.trie)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{report}");
        }
    }
    Ok(())
}

fn search(
    mut config: MaukaConfig,
    word: Option<String>,
    distance: Option<usize>,
    dictionary: Option<PathBuf>,
    json: bool,
) -> MaukaResult<()> {
    if let Some(word) = word {
        config.bench.search_word = word;
    }
    if let Some(distance) = distance {
        config.bench.search_distance = distance;
    }
    if dictionary.is_some() {
        config.bench.dictionary = dictionary;
    }
    config.validate()?;

    let report = bench::run_search(&config.bench, &config.trie)?;
    print_report(&report, json)
}

/// Main entry point for the application.
fn main() -> MaukaResult<()> {
    let args = Args::parse();
    let reporter = TracingErrorReporter;

    let loader = ConfigLoader::new(args.config.as_deref(), config::ENV_PREFIX);
    let loaded = loader.load();
    let default_log = LogConfig::default();
    init_logging(loaded.as_ref().map(|c| &c.log).unwrap_or(&default_log))?;

    let json = args.json;
    let (component, result) = match args.command.unwrap_or(Command::Compare { count: None }) {
        Command::GenConfig { output } => ("gen-config", gen_config(&output)),
        Command::Validate => (
            "config",
            loaded
                .map(|_| info!("Configuration validated successfully"))
                .map_err(MaukaError::from),
        ),
        Command::Compare { count } => (
            "compare",
            loaded
                .map_err(MaukaError::from)
                .and_then(|config| compare(config, count, json)),
        ),
        Command::Search {
            word,
            distance,
            dictionary,
        } => (
            "search",
            loaded
                .map_err(MaukaError::from)
                .and_then(|config| search(config, word, distance, dictionary, json)),
        ),
    };

    if let Err(e) = result {
        let mut context = ErrorContext::new(e, component);
        if let Some(path) = &args.config {
            context = context.with_details(format!("config file: {}", path.display()));
        }
        reporter.report(context);
        process::exit(1);
    }
    Ok(())
}
