//! birdbath - resumable tweet hydration from id lists
//!
//! Feeds a file of numeric tweet ids through an authenticated platform
//! session and appends the full records to a CSV store, skipping ids
//! already hydrated or already written off in earlier runs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "birdbath")]
#[command(about = "Resumable tweet hydration from id lists")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging on the console (the log file always gets it)
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress info logs (only warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./birdbath.toml or ~/.config/birdbath/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Diagnostic log file (per-attempt detail lands here)
    #[arg(long, global = true, default_value = "birdbath.log")]
    log_file: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Hydrate tweet ids from an input file
    Hydrate(HydrateArgs),
    /// Show current configuration
    Config,
}

#[derive(Args, Debug)]
struct HydrateArgs {
    /// Input file with tweet ids, one per line
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV file for hydrated tweets
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File to log permanently failed tweet ids
    #[arg(long)]
    failed: Option<PathBuf>,

    /// Batch size for saving results
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Total limit of tweets to hydrate this run (0 or less hydrates nothing)
    #[arg(short, long)]
    limit: Option<i64>,

    /// Attempts per tweet before it is recorded as failed
    #[arg(short, long)]
    retries: Option<u32>,

    /// Session cookie cache file
    #[arg(long)]
    cookie_file: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(birdbath_core::ProgressContext::new());

    // Logging:
    //   console: info unless --debug / --quiet, transport targets suppressed
    //   file:    everything at debug+, timestamped
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    birdbath_core::init_logging(cli.quiet, cli.debug, Some(&cli.log_file), multi);

    // Load configuration
    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Hydrate(args) => {
            let run_config = resolve_run_config(args, &config);
            birdbath_x::run(&run_config, &progress)
        }
        Command::Config => {
            print_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Merge CLI flags over config-file values over defaults.
fn resolve_run_config(args: HydrateArgs, config: &Config) -> birdbath_x::RunConfig {
    birdbath_x::RunConfig {
        input: args.input.unwrap_or_else(|| config.run.input.clone()),
        output: args.output.unwrap_or_else(|| config.run.output.clone()),
        failed: args.failed.unwrap_or_else(|| config.run.failed.clone()),
        cookie_file: args
            .cookie_file
            .unwrap_or_else(|| config.auth.cookie_file.clone()),
        base_url: config.api.base_url.clone(),
        batch_size: args.batch_size.unwrap_or(config.run.batch_size),
        limit: args.limit.unwrap_or(config.run.limit),
        retry: birdbath_core::RetryPolicy::new(
            args.retries.unwrap_or(config.run.retries),
            Duration::from_secs_f64(config.run.retry_delay_secs),
        ),
        pacer: birdbath_core::Pacer::new(
            Duration::from_secs_f64(config.pacing.min_secs),
            Duration::from_secs_f64(config.pacing.max_secs),
        ),
        credentials: config.auth.credentials(),
    }
}

fn print_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec!["Input", &config.run.input.display().to_string()]);
    table.add_row(vec!["Output", &config.run.output.display().to_string()]);
    table.add_row(vec!["Failed log", &config.run.failed.display().to_string()]);
    table.add_row(vec!["Batch size", &config.run.batch_size.to_string()]);
    table.add_row(vec!["Limit per run", &config.run.limit.to_string()]);
    table.add_row(vec![
        "Retries",
        &format!(
            "{} ({}s between attempts)",
            config.run.retries, config.run.retry_delay_secs
        ),
    ]);
    table.add_row(vec!["API base URL", &config.api.base_url]);
    table.add_row(vec![
        "Cookie file",
        &config.auth.cookie_file.display().to_string(),
    ]);
    table.add_row(vec![
        "Credentials",
        if config.auth.credentials().is_some() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec![
        "Pacing",
        &format!("{}s - {}s", config.pacing.min_secs, config.pacing.max_secs),
    ]);

    eprintln!("\n{table}");
}
