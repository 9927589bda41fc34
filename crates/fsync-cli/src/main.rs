//! fsync - one-way directory tree synchronizer
//!
//! Compares a first, authoritative directory against a second one and copies
//! new and changed files across, optionally removing files the first tree no
//! longer has.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use fsync_cli::display::{create_spinner, print_banner, print_report};
use fsync_cli::json_output::SyncResultJson;
use fsync_cli::{SyncOptions, Synchronizer};
use fsync_config::{ConfigBuilder, ConfigLoader, LoggingConfig, Settings};
use fsync_diff::SyncRequest;
use fsync_io::PoolConfig;
use fsync_types::{HashAlgorithm, MatchCasing, WorkerCount};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// fsync - one-way directory tree synchronizer
#[derive(Parser)]
#[command(
    name = "fsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Synchronize a second directory tree with a first one",
    long_about = "Walks two directory trees side by side, reports files that were created,\n\
                  modified or deleted in the first tree, and copies the changes into the\n\
                  second tree with a pool of worker threads."
)]
struct Cli {
    /// Authoritative directory
    first: PathBuf,

    /// Directory to bring in line with the first
    second: PathBuf,

    /// Hash algorithm (xxh3, blake3, sha256); requires --hash
    #[arg(short = 'a', long)]
    algorithm: Option<HashAlgorithm>,

    /// Compare file contents by hash
    #[arg(short = 'H', long)]
    hash: bool,

    /// Compare file sizes
    #[arg(short = 'S', long)]
    size: bool,

    /// Include encrypted files
    #[arg(short = 'e', long)]
    include_encrypted: bool,

    /// Include hidden files and directories
    #[arg(short = 'j', long)]
    include_hidden: bool,

    /// Include sparse files
    #[arg(short = 'o', long)]
    include_sparse: bool,

    /// List the special directories `.` and `..`
    #[arg(short = 'd', long)]
    special_directories: bool,

    /// Include system files
    #[arg(short = 'm', long)]
    include_system: bool,

    /// Recurse into subdirectories
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Report differences without changing anything
    #[arg(short = 's', long)]
    simulate: bool,

    /// Verbose mode - trace output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - errors only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Wildcard for file names (`*` and `?`)
    #[arg(short = 'w', long)]
    wildcard: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of copy workers (capped at the processor count)
    #[arg(long)]
    workers: Option<usize>,

    /// Delete files that only exist in the second directory
    #[arg(long)]
    delete: bool,

    /// Treat unreadable directories as empty
    #[arg(long)]
    ignore_inaccessible: bool,

    /// Compare names case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Apply command-line flags on top of loaded settings
    fn apply_to(&self, settings: &mut Settings) {
        let enumeration = &mut settings.enumeration;
        enumeration.recurse_subdirectories |= self.recursive;
        enumeration.include_hidden |= self.include_hidden;
        enumeration.include_system |= self.include_system;
        enumeration.include_sparse |= self.include_sparse;
        enumeration.include_encrypted |= self.include_encrypted;
        enumeration.include_special_directories |= self.special_directories;
        enumeration.ignore_inaccessible |= self.ignore_inaccessible;
        if self.case_sensitive {
            enumeration.match_casing = MatchCasing::CaseSensitive;
        }
        if let Some(wildcard) = &self.wildcard {
            enumeration.wildcard = wildcard.clone();
        }

        let comparison = &mut settings.comparison;
        comparison.use_hash |= self.hash;
        comparison.use_size |= self.size;
        if self.algorithm.is_some() {
            comparison.hash_algorithm = self.algorithm;
        }

        if self.workers.is_some() {
            settings.pool.workers = self.workers;
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = load_settings(&cli)?;
    cli.apply_to(&mut settings);
    ConfigBuilder::validate(&settings)?;

    init_logging(&settings.logging, cli.verbose, cli.quiet)?;
    info!("fsync v{} starting", env!("CARGO_PKG_VERSION"));

    let request = SyncRequest::new(&cli.first, &cli.second)
        .with_enumeration(settings.enumeration.clone())
        .with_comparison(settings.comparison);
    let options = SyncOptions {
        simulate: cli.simulate,
        delete: cli.delete,
        pool: pool_config(&settings)?,
    };
    let synchronizer = Synchronizer::new(request, options)?;

    let show_console = !cli.quiet && !cli.json;
    if show_console {
        print_banner(&cli.first, &cli.second, cli.simulate);
    }

    let spinner = create_spinner(!show_console);
    let report = synchronizer
        .run_with(|difference| {
            if let Some(pb) = &spinner {
                pb.inc(1);
                pb.set_message(difference.relative_path().display().to_string());
            }
        })
        .context("Synchronization failed")?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if cli.json {
        println!("{}", SyncResultJson::from_report(&report).to_json()?);
    } else if !cli.quiet {
        print_report(&report);
    }

    if report.is_success() {
        if show_console {
            println!("{} Synchronization completed", style("✓").green());
        }
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default()?,
    };
    Ok(settings)
}

fn pool_config(settings: &Settings) -> Result<PoolConfig> {
    let workers: Option<WorkerCount> = settings.pool.worker_count()?;
    Ok(PoolConfig {
        workers,
        buffer_size: settings.pool.buffer_size()?,
        retry: settings.pool.retry_policy()?,
        ..PoolConfig::default()
    })
}

fn init_logging(logging: &LoggingConfig, verbose: bool, quiet: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if verbose {
        "trace"
    } else if quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(verbose)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.with_ansi(logging.colored_output).init();
    }

    Ok(())
}
