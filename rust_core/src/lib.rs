//! Gridiron Core - team statistics normalization engine.
//!
//! This crate provides:
//! - Flattening of nested `{name, value}` stat payloads
//! - Ordered alias resolution with numeric coercion
//! - Per-game rate derivation and rounding
//! - A declarative, startup-validated metric mapping table
//! - Game log table location in noisy HTML season pages
//! - Per-team aggregation across source families with failure isolation
//! - Schema-ordered row assembly and CSV output
//!
//! Missing upstream data is never an error: it flows through as `None` and
//! ends up as a blank output cell.

pub mod aggregate;
pub mod clients;
pub mod error;
pub mod html;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod output;

pub use aggregate::{Aggregator, Families, TeamRow};
pub use error::{Result, StatsError};
pub use metrics::{CanonicalMetric, TeamMetricsRow};
pub use models::{season_for, HomeAway, Matchup, Position, Team, NFL_TEAMS};
pub use output::{assemble_rows, build_row, write_outputs, OutputSchema};

/// Check both metric tables. Run once at startup; an error here is fatal.
pub fn validate_metric_tables() -> Result<()> {
    metrics::validate_table(metrics::TEAM_STAT_METRICS)?;
    metrics::validate_starters(metrics::STARTER_METRICS, metrics::TEAM_STAT_METRICS)
}
