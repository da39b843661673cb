//! activity-indicator
//!
//! Runs a batch of network calls through an instrumented slot and draws the
//! aggregated activity bar on stderr.
//!
//! ```text
//!   simulate / fetch
//!         │
//!         ▼
//!   ┌─────────────┐   fetch()   ┌──────────────────┐   call()   ┌───────────┐
//!   │   session   │────────────▶│  NetworkSlot     │───────────▶│ primitive │
//!   └─────────────┘             │  + ActivityLayer │            └───────────┘
//!                               └────────┬─────────┘
//!                                        │ 0→1 / →0
//!                                        ▼
//!                               ┌──────────────────┐  watch   ┌──────────┐
//!                               │ProgressIndicator │─────────▶│ renderer │
//!                               └──────────────────┘          └──────────┘
//! ```

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use activity_indicator::config::{load_config, IndicatorConfig};
use activity_indicator::lifecycle::signals::shutdown_on_ctrl_c;
use activity_indicator::lifecycle::{run_session, SessionOptions, SessionSummary, Shutdown};
use activity_indicator::net::{http, simulated};
use activity_indicator::observability::{logging, metrics};
use activity_indicator::NetworkSlot;

#[derive(Parser)]
#[command(name = "activity-indicator")]
#[command(about = "Aggregate concurrent network calls into one progress bar", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum calls in flight (overrides client.max_concurrency).
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print the session summary as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue simulated calls with random latency and failures
    Simulate {
        #[arg(short = 'n', long, default_value_t = 12)]
        calls: usize,

        #[arg(long, default_value_t = 50)]
        min_latency_ms: u64,

        #[arg(long, default_value_t = 800)]
        max_latency_ms: u64,

        /// Probability in 0.0..=1.0 that a call fails.
        #[arg(long, default_value_t = 0.2)]
        failure_rate: f64,
    },
    /// GET each URL over HTTP
    Fetch {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => IndicatorConfig::default(),
    };

    logging::init(&config.observability)?;
    tracing::info!("activity-indicator v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let mut options = SessionOptions::from_config(&config);
    if let Some(concurrency) = cli.concurrency {
        options.concurrency = concurrency;
    }

    let shutdown = Arc::new(Shutdown::new());
    let _signals = shutdown_on_ctrl_c(shutdown.clone());

    let summary = match cli.command {
        Commands::Simulate {
            calls,
            min_latency_ms,
            max_latency_ms,
            failure_rate,
        } => {
            let workload = simulated::Workload {
                calls,
                min_latency_ms,
                max_latency_ms,
                failure_rate,
            };
            let requests = simulated::generate(&workload, &mut rand::thread_rng());
            let slot = Arc::new(NetworkSlot::new(simulated::primitive()));
            run_session(&slot, requests, &options, &shutdown).await?
        }
        Commands::Fetch { urls } => {
            let requests = urls
                .iter()
                .map(|url| http::get_request(url))
                .collect::<Result<Vec<_>, _>>()?;
            let client = http::build_client(&config.client)?;
            let slot = Arc::new(NetworkSlot::new(http::primitive(client)));
            run_session(&slot, requests, &options, &shutdown).await?
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    println!(
        "{} of {} calls settled in {} ms{}",
        summary.completed,
        summary.requested,
        summary.elapsed_ms,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
    println!(
        "  succeeded: {}  failed: {}  cancelled: {}",
        summary.calls.succeeded, summary.calls.failed, summary.calls.cancelled
    );
    println!(
        "  indicator shown {} time(s), completed {} time(s)",
        summary.progress.starts, summary.progress.completions
    );
}
