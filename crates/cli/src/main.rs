// ABOUTME: CLI for running one pagewatch batch over the configured sources.
// ABOUTME: Loads rules, fetches every page, appends results, prints JSON and sends the summary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use pagewatch_engine::result::TIMESTAMP_FORMAT;
use pagewatch_engine::sink::jsonl::DEFAULT_RESULTS_PATH;
use pagewatch_engine::sink::telegram::TELEGRAM_API;
use pagewatch_engine::{
    load_rules, Batch, BatchSummary, JsonLinesSink, ResultSink, RunnerBuilder, TelegramNotifier,
    DEFAULT_RULES_PATH,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Visit the configured pages once and record what was found.
#[derive(Parser, Debug)]
#[command(name = "pagewatch")]
#[command(about = "Extract keyword counts and presence/date-window checks from configured pages", long_about = None)]
struct Args {
    /// JSON rules file
    #[arg(short = 'c', long, env = "PAGEWATCH_CONFIG", default_value = DEFAULT_RULES_PATH)]
    config: PathBuf,

    /// JSON Lines file results are appended to
    #[arg(short = 'o', long, env = "PAGEWATCH_OUTPUT", default_value = DEFAULT_RESULTS_PATH)]
    output: PathBuf,

    /// Do not append results to a file
    #[arg(long, default_value_t = false)]
    no_output: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Pause after each successful fetch, in milliseconds
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Telegram bot token for run notifications
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_token: Option<String>,

    /// Telegram chat receiving run notifications
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    telegram_chat_id: Option<String>,

    /// Bot API base URL
    #[arg(long, env = "PAGEWATCH_TELEGRAM_API", default_value = TELEGRAM_API, hide = true)]
    telegram_api: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let started_at = Local::now().naive_local();
    let timestamp = started_at.format(TIMESTAMP_FORMAT).to_string();

    let notifier = match TelegramNotifier::new(
        args.telegram_token.clone(),
        args.telegram_chat_id.clone(),
    ) {
        Ok(n) => Some(n.with_api_base(args.telegram_api.clone())),
        Err(err) => {
            warn!(error = %err, "telegram notifier unavailable");
            None
        }
    };

    match run(&args, started_at, notifier.as_ref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("run failed: {:#}", err);
            if let Some(notifier) = &notifier {
                notifier.send_failure(&format!("{:#}", err), &timestamp);
            }
            ExitCode::from(1)
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args, started_at: NaiveDateTime, notifier: Option<&TelegramNotifier>) -> Result<()> {
    let rules = load_rules(&args.config)
        .with_context(|| format!("loading rules from {}", args.config.display()))?;
    if rules.is_empty() {
        bail!("no sources configured in {}", args.config.display());
    }

    let mut builder = RunnerBuilder::new()
        .timeout(Duration::from_secs(args.timeout_secs))
        .delay(Duration::from_millis(args.delay_ms));
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    let runner = builder.build().context("building HTTP client")?;

    let batch = runner.run(&rules, started_at);
    info!(results = batch.len(), "batch complete");

    let mut sinks: Vec<&dyn ResultSink> = Vec::new();
    let jsonl = JsonLinesSink::new(&args.output);
    if !args.no_output {
        sinks.push(&jsonl);
    }
    if let Some(notifier) = notifier {
        sinks.push(notifier);
    }
    deliver(&batch, &sinks);

    print_batch(&batch, args.compact)?;

    let summary = BatchSummary::from_batch(&batch);
    info!(
        successful = summary.successful,
        failed = summary.failed,
        "run finished"
    );
    Ok(())
}

/// Hands the batch to every sink; one sink failing does not skip the others.
fn deliver(batch: &Batch, sinks: &[&dyn ResultSink]) {
    for sink in sinks {
        if let Err(err) = sink.accept(batch) {
            warn!(sink = sink.name(), error = %err, "sink failed");
        }
    }
}

fn print_batch(batch: &Batch, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(batch)?
    } else {
        serde_json::to_string_pretty(batch)?
    };
    println!("{}", output);
    Ok(())
}
