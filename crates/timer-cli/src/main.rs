//! Interval timer driver.
//!
//! Runs a drift-free tick loop with optional simulated work per tick,
//! applies a caller-side lag policy, and prints every tick followed by a
//! lag summary.

mod policy;
mod signals;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use timer_common::config::TimerConfig;
use timer_common::metrics::MetricsSnapshot;
use timer_runtime::Scheduler;
use tracing::{info, warn};

use crate::policy::TickPolicy;
use crate::signals::SignalHandler;

/// Environment variable naming a configuration file.
const CONFIG_ENV: &str = "INTERVAL_TIMER_CONFIG";

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "interval-timer",
    about = "Drift-free interval timer - ticks aligned to absolute period boundaries",
    version,
    long_about = None
)]
struct Args {
    /// Path to a timer configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tick period, e.g. "1s" or "10ms" (overrides config file).
    #[arg(long, short = 'p', value_parser = humantime::parse_duration)]
    period: Option<Duration>,

    /// Index of the first tick (overrides config file).
    #[arg(long)]
    start: Option<u64>,

    /// Stop before this tick index (overrides config file).
    #[arg(long)]
    stop: Option<u64>,

    /// Simulated work performed after each tick, e.g. "900ms".
    #[arg(long, short = 'w', value_parser = humantime::parse_duration)]
    work: Option<Duration>,

    /// Stop once a tick lags its boundary by more than this, e.g. "500ms".
    #[arg(long, value_parser = humantime::parse_duration)]
    max_lag: Option<Duration>,

    /// Stop at the first missed interval.
    #[arg(long)]
    stop_on_miss: bool,

    /// Fail as soon as a tick is requested after its boundary has passed.
    #[arg(long)]
    strict: bool,

    /// Run the tick loop in a dedicated thread.
    #[arg(long)]
    threaded: bool,

    /// Print ticks and the summary as JSON lines.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

/// End-of-run report.
#[derive(Debug, Serialize)]
struct Summary {
    ticks: u64,
    next_index: u64,
    signals: u32,
    metrics: Option<MetricsSnapshot>,
    percentiles_ns: Vec<(f64, u64)>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting interval timer");

    let mut config = load_config(&args)?;
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid timer configuration")?;

    info!(
        period = %humantime::format_duration(config.period),
        start = config.start,
        stop = ?config.stop,
        "Configuration loaded"
    );

    let signal_handler = SignalHandler::new().context("Failed to set up signal handlers")?;
    let policy = TickPolicy {
        stop_on_miss: args.stop_on_miss,
        max_lag: args.max_lag,
        strict: args.strict,
    };
    let work = args.work;
    let json = args.json;

    if args.threaded {
        info!("Running tick loop in a dedicated thread");
        let handle = std::thread::Builder::new()
            .name("interval-timer".into())
            .spawn(move || run_loop(&config, policy, work, json, &signal_handler))
            .context("Failed to spawn tick thread")?;
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("tick thread panicked"))?
    } else {
        run_loop(&config, policy, work, json, &signal_handler)
    }
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!("interval_timer={level},timer_runtime={level},timer_common={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `INTERVAL_TIMER_CONFIG` environment variable
/// 3. `interval-timer.toml` in the working directory
/// 4. Built-in defaults
fn load_config(args: &Args) -> Result<TimerConfig> {
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return TimerConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from {CONFIG_ENV}");
            return TimerConfig::from_file(&config_path)
                .with_context(|| format!("Failed to load config from {CONFIG_ENV}={env_path}"));
        }
        warn!(
            path = %env_path,
            "{CONFIG_ENV} set but file does not exist, checking other locations"
        );
    }

    let local_path = PathBuf::from("interval-timer.toml");
    if local_path.exists() {
        info!(?local_path, "Loading config from working directory");
        return TimerConfig::from_file(&local_path)
            .with_context(|| format!("Failed to load config from {}", local_path.display()));
    }

    info!("No config file found, using built-in defaults");
    Ok(TimerConfig::default())
}

/// Command-line values take precedence over the config file.
fn apply_overrides(config: &mut TimerConfig, args: &Args) {
    if let Some(period) = args.period {
        config.period = period;
    }
    if let Some(start) = args.start {
        config.start = start;
    }
    if args.stop.is_some() {
        config.stop = args.stop;
    }
}

/// Pull ticks until the sequence ends, a policy trips, or shutdown is
/// requested.
fn run_loop(
    config: &TimerConfig,
    policy: TickPolicy,
    work: Option<Duration>,
    json: bool,
    signal_handler: &SignalHandler,
) -> Result<()> {
    let mut scheduler =
        Scheduler::from_config(config).context("Failed to create scheduler")?;
    let mut ticks = 0u64;
    let mut outcome = Ok(());

    while let Some(tick) = scheduler.next() {
        ticks += 1;

        if json {
            println!("{}", serde_json::to_string(&tick)?);
        } else {
            println!("{tick}");
        }

        if tick.missed() {
            warn!(index = tick.index(), lag_s = tick.lag(), "Interval missed");
        }

        if let Err(violation) = policy.check(&tick) {
            outcome = Err(violation);
            break;
        }

        if signal_handler.shutdown_requested() {
            info!(ticks, "Shutdown requested, leaving tick loop");
            break;
        }

        if let Some(work) = work {
            std::thread::sleep(work);
        }
    }

    // Lets the signal watcher thread exit
    signal_handler.request_shutdown();

    report(&scheduler, config, ticks, json, signal_handler)?;
    outcome.map_err(Into::into)
}

/// Print the end-of-run lag summary.
fn report(
    scheduler: &Scheduler,
    config: &TimerConfig,
    ticks: u64,
    json: bool,
    signal_handler: &SignalHandler,
) -> Result<()> {
    let metrics = scheduler.metrics();
    let percentiles_ns = metrics
        .map(|m| m.percentiles(&config.metrics.percentiles))
        .unwrap_or_default()
        .into_iter()
        .map(|(p, d)| (p, u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)))
        .collect();

    let summary = Summary {
        ticks,
        next_index: scheduler.index(),
        signals: signal_handler.state().signal_count(),
        metrics: metrics.map(timer_common::metrics::LagMetrics::snapshot),
        percentiles_ns,
    };

    if json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    info!(
        ticks = summary.ticks,
        signals = summary.signals,
        state = %scheduler.state(),
        "Tick loop finished"
    );
    if let Some(snapshot) = summary.metrics {
        println!(
            "ticks={} missed={} lag_min={:?} lag_mean={:?} lag_max={:?}",
            snapshot.total_ticks,
            snapshot.missed_count,
            snapshot.min_lag_ns.map(Duration::from_nanos),
            snapshot.mean_lag_ns.map(Duration::from_nanos),
            snapshot.max_lag_ns.map(Duration::from_nanos),
        );
        for (p, ns) in &summary.percentiles_ns {
            println!("  p{p}: {:?}", Duration::from_nanos(*ns));
        }
    }
    Ok(())
}
