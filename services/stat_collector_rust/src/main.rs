mod config;

use anyhow::{Context, Result};
use chrono::Utc;
use config::Config;
use dotenv::dotenv;
use gridiron_core::clients::{espn, HttpFetcher};
use gridiron_core::{
    assemble_rows, season_for, validate_metric_tables, write_outputs, Aggregator, OutputSchema,
    TeamRow, NFL_TEAMS,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting stat collector...");

    let config = Config::from_env().context("Failed to load configuration")?;
    validate_metric_tables().context("Invalid metric mapping table")?;

    let schema = OutputSchema::load(&config.schema_path)
        .with_context(|| format!("Failed to load output schema {}", config.schema_path.display()))?;
    schema.warn_unmapped();

    let fetcher = HttpFetcher::new(config.fetch_config()).context("Failed to build HTTP client")?;

    let (season, season_type) = season_for(config.target_date);
    info!(
        date = %config.target_date,
        timezone = %config.timezone,
        season,
        season_type,
        "Collecting slate"
    );

    let matchups = espn::fetch_matchups(&fetcher, config.target_date).await;
    let team_rows: Vec<TeamRow> = if matchups.is_empty() {
        warn!(date = %config.target_date, "No NFL games found; writing header-only file");
        Vec::new()
    } else {
        Aggregator::new(&fetcher, season, season_type)
            .with_families(config.families())
            .run(NFL_TEAMS)
            .await
    };

    let rows = assemble_rows(config.target_date, &matchups, &team_rows, &schema);
    let latest = config.latest_path();
    write_outputs(
        &latest,
        &config.archive_dir,
        Utc::now().date_naive(),
        &schema,
        &rows,
    )
    .context("Failed to write output files")?;

    info!(rows = rows.len(), path = %latest.display(), "Stat collection complete");
    Ok(())
}
