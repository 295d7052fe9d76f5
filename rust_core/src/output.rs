//! Output schema, row assembly and CSV writing.
//!
//! The schema file fixes the column order of every output file. Each
//! matchup becomes one row; a metric the sources could not provide is written
//! as an empty cell, never dropped.

use crate::aggregate::TeamRow;
use crate::error::{Result, StatsError};
use crate::metrics::{CanonicalMetric, TeamMetricsRow};
use crate::models::Matchup;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Per-matchup identity columns, always present in the output.
pub const BASE_FIELDS: [&str; 5] = ["game_date", "game_id", "team", "opponent", "home_away"];

/// Written for any cell without a value.
pub const BLANK: &str = "";

/// Ordered output columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    columns: Vec<String>,
}

impl OutputSchema {
    /// Read the `name` column of a schema CSV, in file order.
    ///
    /// Base fields the file does not list are placed first. A missing file,
    /// a file without a `name` column, or one that names no columns is an
    /// error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| StatsError::Schema(format!("{}: {}", path.display(), e)))?;

        let name_idx = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == "name")
            .ok_or_else(|| {
                StatsError::Schema(format!("{}: no `name` column", path.display()))
            })?;

        let mut names = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(name) = record.get(name_idx).map(str::trim).filter(|n| !n.is_empty()) {
                names.push(name.to_string());
            }
        }

        Self::from_names(names).map_err(|e| match e {
            StatsError::Schema(msg) => StatsError::Schema(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let listed: Vec<String> = names.into_iter().map(Into::into).collect();
        if listed.is_empty() {
            return Err(StatsError::Schema("schema lists no columns".to_string()));
        }

        let mut columns: Vec<String> = BASE_FIELDS
            .iter()
            .filter(|base| !listed.iter().any(|c| c == *base))
            .map(|base| base.to_string())
            .collect();
        for name in listed {
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Metrics the pipeline can produce that no schema column will carry.
    pub fn unmapped_metrics(&self) -> Vec<CanonicalMetric> {
        CanonicalMetric::ALL
            .iter()
            .copied()
            .filter(|m| !self.columns.iter().any(|c| c == m.column()))
            .collect()
    }

    /// Log every unmapped metric once.
    pub fn warn_unmapped(&self) {
        for metric in self.unmapped_metrics() {
            warn!(column = metric.column(), "Metric has no column in output schema");
        }
    }
}

/// Render a metric value without trailing zeros (`0.8`, `90`, `21.45`).
pub fn format_value(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        BLANK.to_string()
    }
}

/// One output row for a matchup, in schema order.
pub fn build_row(
    game_date: NaiveDate,
    matchup: &Matchup,
    schema: &OutputSchema,
    metrics: Option<&TeamMetricsRow>,
) -> Vec<String> {
    schema
        .columns()
        .iter()
        .map(|column| match column.as_str() {
            "game_date" => game_date.format("%Y-%m-%d").to_string(),
            "game_id" => matchup.game_id.clone(),
            "team" => matchup.team.clone(),
            "opponent" => matchup.opponent.clone(),
            "home_away" => matchup.home_away.code().to_string(),
            other => CanonicalMetric::from_column(other)
                .and_then(|m| metrics.and_then(|row| row.get(m)))
                .map(format_value)
                .unwrap_or_else(|| BLANK.to_string()),
        })
        .collect()
}

/// Rows for every matchup, in matchup order. Teams without aggregated
/// metrics still get a row with blank metric cells.
pub fn assemble_rows(
    game_date: NaiveDate,
    matchups: &[Matchup],
    team_rows: &[TeamRow],
    schema: &OutputSchema,
) -> Vec<Vec<String>> {
    matchups
        .iter()
        .map(|m| {
            let metrics = team_rows.iter().find(|r| r.team == m.team).map(|r| &r.metrics);
            build_row(game_date, m, schema, metrics)
        })
        .collect()
}

fn write_csv(path: &Path, schema: &OutputSchema, rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(schema.columns())?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the latest file and a dated archive snapshot with identical
/// content. Returns the archive path.
pub fn write_outputs(
    latest_path: &Path,
    archive_dir: &Path,
    archive_date: NaiveDate,
    schema: &OutputSchema,
    rows: &[Vec<String>],
) -> Result<PathBuf> {
    write_csv(latest_path, schema, rows)?;

    let archive_path = archive_dir.join(format!("{}.csv", archive_date.format("%Y-%m-%d")));
    write_csv(&archive_path, schema, rows)?;

    info!(
        rows = rows.len(),
        latest = %latest_path.display(),
        archive = %archive_path.display(),
        "Wrote output files"
    );
    Ok(archive_path)
}
