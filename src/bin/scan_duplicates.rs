use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use participant_matching::scan::scan_store;
use participant_matching::store::postgres::PgDocumentStore;
use participant_matching::utils::db_connect::connect;
use participant_matching::utils::env::load_env;
use participant_matching::utils::progress_config::ProgressConfig;
use participant_matching::MatcherConfig;

/// Compare every stored participant against every other and list likely duplicates.
#[derive(Parser, Debug)]
#[command(name = "scan_duplicates", version, about)]
struct Args {
    /// Number of highest-scoring pairs to print
    #[arg(long, default_value_t = 50)]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("Starting participant duplicate scan");
    load_env();
    let args = Args::parse();

    let config = MatcherConfig::from_env();
    config.log_config();
    let progress = ProgressConfig::from_env();

    let pool = connect().await.context("Failed to connect to database")?;
    let store = PgDocumentStore::new(pool);

    let mut result = scan_store(&store, &config, &progress)
        .await
        .context("Duplicate scan failed")?;

    info!("=== Scan Summary ===");
    info!("Scan ID: {}", result.summary.scan_id);
    info!("Records scanned: {}", result.summary.records_scanned);
    info!("Records skipped: {}", result.summary.records_skipped);
    info!("Pairs compared: {}", result.summary.pairs_compared);
    info!("Possible duplicates: {}", result.summary.duplicates);
    info!("Duration: {} ms", result.summary.duration_ms);

    result.pairs.truncate(args.top);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
