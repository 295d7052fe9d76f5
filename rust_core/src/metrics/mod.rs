//! Canonical metrics and the per-team row they are resolved into.
//!
//! This module provides:
//! - `CanonicalMetric`: the closed set of schema-stable output statistics
//! - `TeamMetricsRow`: resolved values for one team (absent = no usable data)
//! - `table`: the declarative metric mapping tables
//! - `derive`: applies a table to a `RawStatBag`

pub mod derive;
pub mod table;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use derive::{derive_starter_metric, derive_team_metrics};
pub use table::{
    validate_starters, validate_table, Derivation, Divisor, MetricSpec, Operand, StarterSpec,
    GAMES_PLAYED, STARTER_METRICS, TEAM_STAT_METRICS,
};

/// One named, schema-stable output statistic.
///
/// Numbered `NFL n` slots come from the team statistics payload; the snake
/// case columns come from the game log; upper case columns are per-starter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalMetric {
    // Offense / team efficiency
    CompletionPct,
    FirstDownsPerGame,
    FourthDownConvPct,
    FieldGoalPct,
    PointsPerGame,
    TurnoverDifferentialPerGame,
    InterceptionsThrownPerGame,
    FumblesLostPerGame,
    SacksPerGame,
    PenaltiesPerGame,
    PassingYardsPerGame,
    RushingYardsPerGame,
    ReceivingYardsPerGame,
    ThirdDownConvPct,
    KickReturnYardsPerGame,
    PuntReturnYardsPerGame,
    // Defense & turnovers
    ForcedFumblesPerGame,
    DefensiveSacksPerGame,
    PointsAllowedPerGame,
    TakeawaysPerGame,
    DefensivePenaltiesPerGame,
    PenaltyYardsPerGame,
    // Special teams
    ExtraPointPct,
    ExtraPointAttemptsPerGame,
    ExtraPointsMadePerGame,
    KickoffAverageYards,
    GrossPuntAverageYards,
    // Splits and baselines
    HomePointsPerGame,
    RoadPointsPerGame,
    LeagueQbRating,
    // Game log
    FirstQuarterPointsPerGame,
    FourthQuarterPointsPerGame,
    FirstQuarterPointsAllowedPerGame,
    FourthQuarterPointsAllowedPerGame,
    RushAttemptsPerGame,
    PassAttemptsPerGame,
    PassCompletionsPerGame,
    GameLogCompletionPct,
    // Starters
    StarterQbPassingYards,
    StarterRbRushingYards,
    StarterWrReceivingYards,
    StarterKickerFgPct,
}

impl CanonicalMetric {
    pub const ALL: [CanonicalMetric; 42] = [
        CanonicalMetric::CompletionPct,
        CanonicalMetric::FirstDownsPerGame,
        CanonicalMetric::FourthDownConvPct,
        CanonicalMetric::FieldGoalPct,
        CanonicalMetric::PointsPerGame,
        CanonicalMetric::TurnoverDifferentialPerGame,
        CanonicalMetric::InterceptionsThrownPerGame,
        CanonicalMetric::FumblesLostPerGame,
        CanonicalMetric::SacksPerGame,
        CanonicalMetric::PenaltiesPerGame,
        CanonicalMetric::PassingYardsPerGame,
        CanonicalMetric::RushingYardsPerGame,
        CanonicalMetric::ReceivingYardsPerGame,
        CanonicalMetric::ThirdDownConvPct,
        CanonicalMetric::KickReturnYardsPerGame,
        CanonicalMetric::PuntReturnYardsPerGame,
        CanonicalMetric::ForcedFumblesPerGame,
        CanonicalMetric::DefensiveSacksPerGame,
        CanonicalMetric::PointsAllowedPerGame,
        CanonicalMetric::TakeawaysPerGame,
        CanonicalMetric::DefensivePenaltiesPerGame,
        CanonicalMetric::PenaltyYardsPerGame,
        CanonicalMetric::ExtraPointPct,
        CanonicalMetric::ExtraPointAttemptsPerGame,
        CanonicalMetric::ExtraPointsMadePerGame,
        CanonicalMetric::KickoffAverageYards,
        CanonicalMetric::GrossPuntAverageYards,
        CanonicalMetric::HomePointsPerGame,
        CanonicalMetric::RoadPointsPerGame,
        CanonicalMetric::LeagueQbRating,
        CanonicalMetric::FirstQuarterPointsPerGame,
        CanonicalMetric::FourthQuarterPointsPerGame,
        CanonicalMetric::FirstQuarterPointsAllowedPerGame,
        CanonicalMetric::FourthQuarterPointsAllowedPerGame,
        CanonicalMetric::RushAttemptsPerGame,
        CanonicalMetric::PassAttemptsPerGame,
        CanonicalMetric::PassCompletionsPerGame,
        CanonicalMetric::GameLogCompletionPct,
        CanonicalMetric::StarterQbPassingYards,
        CanonicalMetric::StarterRbRushingYards,
        CanonicalMetric::StarterWrReceivingYards,
        CanonicalMetric::StarterKickerFgPct,
    ];

    /// Output column name for this metric.
    pub fn column(&self) -> &'static str {
        match self {
            CanonicalMetric::CompletionPct => "NFL 1",
            CanonicalMetric::FirstDownsPerGame => "NFL 2",
            CanonicalMetric::FourthDownConvPct => "NFL 3",
            CanonicalMetric::FieldGoalPct => "NFL 4",
            CanonicalMetric::PointsPerGame => "NFL 5",
            CanonicalMetric::TurnoverDifferentialPerGame => "NFL 6",
            CanonicalMetric::InterceptionsThrownPerGame => "NFL 7",
            CanonicalMetric::FumblesLostPerGame => "NFL 8",
            CanonicalMetric::SacksPerGame => "NFL 9",
            CanonicalMetric::PenaltiesPerGame => "NFL 10",
            CanonicalMetric::PassingYardsPerGame => "NFL 11",
            CanonicalMetric::RushingYardsPerGame => "NFL 12",
            CanonicalMetric::ReceivingYardsPerGame => "NFL 13",
            CanonicalMetric::ThirdDownConvPct => "NFL 14",
            CanonicalMetric::KickReturnYardsPerGame => "NFL 15",
            CanonicalMetric::PuntReturnYardsPerGame => "NFL 16",
            CanonicalMetric::ForcedFumblesPerGame => "NFL 18",
            CanonicalMetric::DefensiveSacksPerGame => "NFL 19",
            CanonicalMetric::PointsAllowedPerGame => "NFL 22",
            CanonicalMetric::TakeawaysPerGame => "NFL 23",
            CanonicalMetric::DefensivePenaltiesPerGame => "NFL 24",
            CanonicalMetric::PenaltyYardsPerGame => "NFL 25",
            CanonicalMetric::ExtraPointPct => "NFL 29",
            CanonicalMetric::ExtraPointAttemptsPerGame => "NFL 30",
            CanonicalMetric::ExtraPointsMadePerGame => "NFL 31",
            CanonicalMetric::KickoffAverageYards => "NFL 32",
            CanonicalMetric::GrossPuntAverageYards => "NFL 33",
            CanonicalMetric::HomePointsPerGame => "NFL 34",
            CanonicalMetric::RoadPointsPerGame => "NFL 35",
            CanonicalMetric::LeagueQbRating => "NFL 36",
            CanonicalMetric::FirstQuarterPointsPerGame => "off_1q_pts_pg",
            CanonicalMetric::FourthQuarterPointsPerGame => "off_4q_pts_pg",
            CanonicalMetric::FirstQuarterPointsAllowedPerGame => "def_1q_pts_allowed_pg",
            CanonicalMetric::FourthQuarterPointsAllowedPerGame => "def_4q_pts_allowed_pg",
            CanonicalMetric::RushAttemptsPerGame => "rush_att_pg",
            CanonicalMetric::PassAttemptsPerGame => "pass_att_pg",
            CanonicalMetric::PassCompletionsPerGame => "pass_comp_pg",
            CanonicalMetric::GameLogCompletionPct => "pass_comp_pct",
            CanonicalMetric::StarterQbPassingYards => "QB_YDS",
            CanonicalMetric::StarterRbRushingYards => "RB_YDS",
            CanonicalMetric::StarterWrReceivingYards => "WR_YDS",
            CanonicalMetric::StarterKickerFgPct => "K_FG_PCT",
        }
    }

    /// Look up a metric by its output column name.
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.column() == column)
    }
}

impl fmt::Display for CanonicalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Resolved metrics for one team.
///
/// A missing key means the sources had no usable data for that metric; it is
/// never a stand-in for zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMetricsRow {
    values: BTreeMap<CanonicalMetric, f64>,
}

impl TeamMetricsRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: CanonicalMetric, value: f64) {
        self.values.insert(metric, value);
    }

    /// Insert only when `value` is present.
    pub fn set(&mut self, metric: CanonicalMetric, value: Option<f64>) {
        if let Some(v) = value {
            self.values.insert(metric, v);
        }
    }

    pub fn get(&self, metric: CanonicalMetric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn contains(&self, metric: CanonicalMetric) -> bool {
        self.values.contains_key(&metric)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalMetric, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    /// Merge `other` into `self`, keeping values already present.
    pub fn merge_missing(&mut self, other: TeamMetricsRow) {
        for (metric, value) in other.values {
            self.values.entry(metric).or_insert(value);
        }
    }
}
