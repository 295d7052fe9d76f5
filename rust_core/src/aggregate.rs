//! Per-team aggregation across source families.
//!
//! Each team is run through the enabled families in a fixed order (team
//! statistics JSON, game log HTML, starters JSON). A family that cannot
//! fetch or finds an empty payload contributes nothing; the team carries on
//! with whatever the others produced. When two families produce the same
//! metric the earlier one wins.

use crate::clients::{espn, pfr, StatsFetcher};
use crate::html::locate_and_clean;
use crate::metrics::{
    derive_starter_metric, derive_team_metrics, TeamMetricsRow, STARTER_METRICS,
    TEAM_STAT_METRICS,
};
use crate::models::{Position, Team};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Which source families run for each team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Families {
    pub team_stats: bool,
    pub game_log: bool,
    pub starters: bool,
}

impl Default for Families {
    fn default() -> Self {
        Self {
            team_stats: true,
            game_log: true,
            starters: true,
        }
    }
}

/// Merged metrics for one team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRow {
    pub team: &'static str,
    pub metrics: TeamMetricsRow,
}

pub struct Aggregator<'a> {
    fetcher: &'a dyn StatsFetcher,
    season: i32,
    season_type: u8,
    families: Families,
}

impl<'a> Aggregator<'a> {
    pub fn new(fetcher: &'a dyn StatsFetcher, season: i32, season_type: u8) -> Self {
        Self {
            fetcher,
            season,
            season_type,
            families: Families::default(),
        }
    }

    pub fn with_families(mut self, families: Families) -> Self {
        self.families = families;
        self
    }

    /// Aggregate `teams` one at a time, in order.
    ///
    /// Teams whose merged row is empty are left out.
    pub async fn run(&self, teams: &'static [Team]) -> Vec<TeamRow> {
        let mut rows = Vec::with_capacity(teams.len());
        for team in teams {
            let metrics = self.team_row(team).await;
            if metrics.is_empty() {
                warn!(team = team.abbr, "No usable data from any source, skipping team");
                continue;
            }
            debug!(team = team.abbr, metrics = metrics.len(), "Team aggregated");
            rows.push(TeamRow {
                team: team.abbr,
                metrics,
            });
        }
        info!(teams = rows.len(), of = teams.len(), "Aggregation complete");
        rows
    }

    /// Run every enabled family for one team and merge the results.
    pub async fn team_row(&self, team: &Team) -> TeamMetricsRow {
        let mut row = TeamMetricsRow::new();
        if self.families.team_stats {
            row.merge_missing(self.team_stats(team).await);
        }
        if self.families.game_log {
            row.merge_missing(self.game_log(team).await);
        }
        if self.families.starters {
            row.merge_missing(self.starters(team).await);
        }
        row
    }

    async fn team_stats(&self, team: &Team) -> TeamMetricsRow {
        let bag = espn::fetch_team_statistics(self.fetcher, self.season, self.season_type, team.espn_id)
            .await
            .filter(|bag| !bag.is_empty());
        match bag {
            Some(bag) => derive_team_metrics(&bag, TEAM_STAT_METRICS),
            None => {
                warn!(team = team.abbr, source = "team_stats", "Empty or missing payload");
                TeamMetricsRow::new()
            }
        }
    }

    async fn game_log(&self, team: &Team) -> TeamMetricsRow {
        let Some(markup) = pfr::fetch_season_page(self.fetcher, team.pfr_slug, self.season).await
        else {
            warn!(team = team.abbr, source = "game_log", "Empty or missing payload");
            return TeamMetricsRow::new();
        };
        let (table, metrics) = locate_and_clean(&markup);
        if table.is_empty() {
            warn!(team = team.abbr, source = "game_log", "No game log table on season page");
        }
        metrics
    }

    async fn starters(&self, team: &Team) -> TeamMetricsRow {
        let mut row = TeamMetricsRow::new();
        let charts = espn::fetch_depth_charts(self.fetcher, team.espn_id).await;
        if charts.is_empty() {
            warn!(team = team.abbr, source = "starters", "Empty or missing depth chart");
            return row;
        }

        // One athlete can start at two positions; fetch each only once.
        let mut refs: HashMap<Position, Option<String>> = HashMap::new();
        let mut stats = HashMap::new();
        for spec in STARTER_METRICS {
            let athlete = refs
                .entry(spec.position)
                .or_insert_with(|| espn::starter_ref(&charts, spec.position))
                .clone();
            let Some(athlete) = athlete else {
                debug!(team = team.abbr, position = spec.position.abbr(), "No starter listed");
                continue;
            };

            if !stats.contains_key(&athlete) {
                let bag = espn::fetch_athlete_statistics(
                    self.fetcher,
                    &athlete,
                    self.season,
                    self.season_type,
                )
                .await;
                stats.insert(athlete.clone(), bag);
            }
            if let Some(Some(bag)) = stats.get(&athlete) {
                row.set(spec.metric, derive_starter_metric(bag, spec));
            }
        }
        row
    }
}
