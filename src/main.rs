// hotel-merge: prints the merged supplier hotels as JSON

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hotel_merge::{
    FileSupplierSource, HotelAggregator, HotelQuery, HttpSupplierSource, MergeConfig,
    OutputRecord, RetryConfig, SupplierSource,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const NONE_TOKEN: &str = "none";

/// Command-line arguments for hotel-merge
#[derive(Parser, Debug)]
#[command(name = "hotel-merge")]
#[command(about = "Merge hotel data from the acme, patagonia and paperflies suppliers")]
#[command(version)]
struct Args {
    /// Comma separated hotel ids, or "none"
    #[arg(long)]
    hotels: Option<String>,

    /// Comma separated destination ids, or "none"
    #[arg(long)]
    destinations: Option<String>,

    /// Read `<dir>/<supplier>.json` snapshots instead of calling the suppliers
    #[arg(long)]
    from_dir: Option<PathBuf>,

    /// Supplier API base URL
    #[arg(long, env = "HOTEL_MERGE_BASE_URL", default_value = hotel_merge::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "HOTEL_MERGE_TIMEOUT_MS", default_value = "10000")]
    timeout_ms: u64,

    /// Retries for transient supplier failures
    #[arg(long, env = "HOTEL_MERGE_MAX_RETRIES", default_value = "3")]
    max_retries: u32,
}

impl Args {
    fn query(&self) -> HotelQuery {
        HotelQuery {
            hotel_ids: parse_filter(self.hotels.as_deref()),
            destination_ids: parse_filter(self.destinations.as_deref()),
        }
    }

    fn config(&self) -> MergeConfig {
        MergeConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            retry_config: RetryConfig {
                max_retries: self.max_retries,
                ..RetryConfig::default()
            },
        }
    }
}

// Missing flag or the "none" token means the filter was not given
fn parse_filter(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?.trim();
    if raw.eq_ignore_ascii_case(NONE_TOKEN) {
        return None;
    }
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

async fn run<S: SupplierSource>(source: S, query: &HotelQuery) -> Result<Vec<OutputRecord>> {
    HotelAggregator::new(source)
        .aggregate(query)
        .await
        .context("Failed to aggregate supplier data")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout carries only the JSON result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotel_merge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let query = args.query();
    info!(mode = ?query.mode(), "Starting hotel merge");

    let hotels = match &args.from_dir {
        Some(dir) => {
            info!("Reading supplier snapshots from {}", dir.display());
            run(FileSupplierSource::new(dir), &query).await?
        }
        None => {
            let source = HttpSupplierSource::new(args.config())
                .context("Invalid supplier configuration")?;
            run(source, &query).await?
        }
    };

    let output = serde_json::to_string_pretty(&hotels).context("Failed to encode hotels")?;
    println!("{}", output);
    Ok(())
}
