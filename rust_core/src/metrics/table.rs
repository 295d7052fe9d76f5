//! Declarative metric mapping tables.
//!
//! Every canonical metric resolved from a JSON payload is described here as
//! data: which raw fields feed it, how it is derived, and how it is rounded.
//! Adding or renaming a metric is an edit to these tables only.

use super::CanonicalMetric;
use super::CanonicalMetric as M;
use crate::error::{Result, StatsError};
use crate::models::Position;
use crate::normalize::Precision::{Three, Two};
use crate::normalize::{AliasSet, Precision};
use std::collections::HashSet;

/// Games-played divisor used by every team-level per-game metric.
pub const GAMES_PLAYED: AliasSet = AliasSet::new(&["teamGamesPlayed", "gamesPlayed"]);

const HOME_GAMES: AliasSet = AliasSet::new(&["homeGamesPlayed", "homeGames", "gamesPlayedHome"]);
const ROAD_GAMES: AliasSet = AliasSet::new(&["roadGamesPlayed", "roadGames", "gamesPlayedAway"]);

/// Input to a differential: a raw field or a metric resolved earlier in the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Raw(AliasSet),
    Metric(CanonicalMetric),
}

/// Divisor for a per-game derivation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Divisor {
    /// Team games played (`GAMES_PLAYED`)
    TeamGames,
    /// A split-specific games count, e.g. home games only
    Split(AliasSet),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Derivation {
    /// Resolved value, rounded.
    Direct(AliasSet),
    /// A source-computed rate when available, else `total / divisor`.
    PerGame {
        rate: Option<AliasSet>,
        total: AliasSet,
        games: Divisor,
    },
    /// `(plus - minus) / team games played`.
    Differential { plus: Operand, minus: Operand },
    /// Percentage reported by the source, passed through and rounded.
    Percentage(AliasSet),
    /// Copy of a metric resolved earlier in the same row.
    DuplicateOf(CanonicalMetric),
    /// Fixed league baseline.
    Constant(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub metric: CanonicalMetric,
    pub derivation: Derivation,
    pub precision: Precision,
}

const fn spec(metric: CanonicalMetric, derivation: Derivation, precision: Precision) -> MetricSpec {
    MetricSpec {
        metric,
        derivation,
        precision,
    }
}

const fn per_game(total: &'static [&'static str]) -> Derivation {
    Derivation::PerGame {
        rate: None,
        total: AliasSet::new(total),
        games: Divisor::TeamGames,
    }
}

const fn rate_or_total(rate: &'static [&'static str], total: &'static [&'static str]) -> Derivation {
    Derivation::PerGame {
        rate: Some(AliasSet::new(rate)),
        total: AliasSet::new(total),
        games: Divisor::TeamGames,
    }
}

const fn direct(aliases: &'static [&'static str]) -> Derivation {
    Derivation::Direct(AliasSet::new(aliases))
}

const fn pct(aliases: &'static [&'static str]) -> Derivation {
    Derivation::Percentage(AliasSet::new(aliases))
}

/// Team statistics payload -> canonical metrics, in resolution order.
pub static TEAM_STAT_METRICS: &[MetricSpec] = &[
    // Offense / team efficiency
    spec(M::CompletionPct, pct(&["completionPct"]), Two),
    spec(
        M::FirstDownsPerGame,
        rate_or_total(&["firstDownsPerGame"], &["firstDowns"]),
        Two,
    ),
    spec(M::FourthDownConvPct, pct(&["fourthDownConvPct"]), Two),
    spec(M::FieldGoalPct, pct(&["fieldGoalPct"]), Two),
    spec(M::PointsPerGame, direct(&["totalPointsPerGame", "pointsPerGame"]), Two),
    spec(
        M::TurnoverDifferentialPerGame,
        Derivation::Differential {
            plus: Operand::Raw(AliasSet::new(&["totalTakeaways"])),
            minus: Operand::Raw(AliasSet::new(&["totalGiveaways"])),
        },
        Three,
    ),
    spec(M::InterceptionsThrownPerGame, per_game(&["interceptions"]), Three),
    spec(M::FumblesLostPerGame, per_game(&["fumblesLost"]), Three),
    spec(M::SacksPerGame, per_game(&["sacks"]), Three),
    spec(M::PenaltiesPerGame, per_game(&["totalPenalties"]), Three),
    spec(
        M::PassingYardsPerGame,
        rate_or_total(&["passingYardsPerGame"], &["netPassingYards"]),
        Two,
    ),
    spec(
        M::RushingYardsPerGame,
        rate_or_total(&["rushingYardsPerGame"], &["rushingYards"]),
        Two,
    ),
    spec(
        M::ReceivingYardsPerGame,
        rate_or_total(&["receivingYardsPerGame"], &["receivingYards"]),
        Two,
    ),
    spec(M::ThirdDownConvPct, pct(&["thirdDownConvPct"]), Two),
    spec(M::KickReturnYardsPerGame, per_game(&["kickoffReturnYards"]), Two),
    spec(M::PuntReturnYardsPerGame, per_game(&["puntReturnYards"]), Two),
    // Defense & turnovers
    spec(M::ForcedFumblesPerGame, per_game(&["fumblesForced"]), Three),
    spec(M::DefensiveSacksPerGame, Derivation::DuplicateOf(M::SacksPerGame), Three),
    spec(M::PointsAllowedPerGame, per_game(&["pointsAllowed"]), Two),
    spec(M::TakeawaysPerGame, per_game(&["totalTakeaways"]), Three),
    spec(
        M::DefensivePenaltiesPerGame,
        Derivation::DuplicateOf(M::PenaltiesPerGame),
        Three,
    ),
    spec(M::PenaltyYardsPerGame, per_game(&["totalPenaltyYards"]), Two),
    // Special teams
    spec(M::ExtraPointPct, pct(&["extraPointPct"]), Two),
    spec(M::ExtraPointAttemptsPerGame, per_game(&["extraPointAttempts"]), Three),
    spec(M::ExtraPointsMadePerGame, per_game(&["extraPointsMade"]), Three),
    spec(M::KickoffAverageYards, direct(&["avgKickoffYards"]), Two),
    spec(M::GrossPuntAverageYards, direct(&["grossAvgPuntYards"]), Two),
    // Home / road splits
    spec(
        M::HomePointsPerGame,
        Derivation::PerGame {
            rate: None,
            total: AliasSet::new(&[
                "homePointsFor",
                "pointsForHome",
                "homePointsScored",
                "pointsScoredHome",
            ]),
            games: Divisor::Split(HOME_GAMES),
        },
        Two,
    ),
    spec(
        M::RoadPointsPerGame,
        Derivation::PerGame {
            rate: None,
            total: AliasSet::new(&[
                "roadPointsFor",
                "pointsForAway",
                "roadPointsScored",
                "pointsScoredAway",
            ]),
            games: Divisor::Split(ROAD_GAMES),
        },
        Two,
    ),
    spec(M::LeagueQbRating, Derivation::Constant(90.0), Two),
];

/// One per-starter metric: which depth-chart position and which player stat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarterSpec {
    pub metric: CanonicalMetric,
    pub position: Position,
    pub aliases: AliasSet,
    pub precision: Precision,
}

pub static STARTER_METRICS: &[StarterSpec] = &[
    StarterSpec {
        metric: M::StarterQbPassingYards,
        position: Position::Quarterback,
        aliases: AliasSet::new(&["passingYards", "passYards"]),
        precision: Two,
    },
    StarterSpec {
        metric: M::StarterRbRushingYards,
        position: Position::RunningBack,
        aliases: AliasSet::new(&["rushingYards", "rushYards"]),
        precision: Two,
    },
    StarterSpec {
        metric: M::StarterWrReceivingYards,
        position: Position::WideReceiver,
        aliases: AliasSet::new(&["receivingYards"]),
        precision: Two,
    },
    StarterSpec {
        metric: M::StarterKickerFgPct,
        position: Position::Kicker,
        aliases: AliasSet::new(&["fieldGoalPct"]),
        precision: Two,
    },
];

/// Check the structural invariants of a metric table.
///
/// - no metric appears twice
/// - `DuplicateOf` and metric operands reference a metric listed earlier
/// - constants are finite
pub fn validate_table(table: &[MetricSpec]) -> Result<()> {
    let mut seen: HashSet<CanonicalMetric> = HashSet::new();

    for (idx, spec) in table.iter().enumerate() {
        let requires = |dep: CanonicalMetric| -> Result<()> {
            if seen.contains(&dep) {
                Ok(())
            } else {
                Err(StatsError::Config(format!(
                    "metric {} (entry {}) references {} which is not resolved earlier in the table",
                    spec.metric, idx, dep
                )))
            }
        };

        match spec.derivation {
            Derivation::DuplicateOf(dep) => requires(dep)?,
            Derivation::Differential { plus, minus } => {
                for operand in [plus, minus] {
                    if let Operand::Metric(dep) = operand {
                        requires(dep)?;
                    }
                }
            }
            Derivation::Constant(v) if !v.is_finite() => {
                return Err(StatsError::Config(format!(
                    "metric {} has a non-finite constant",
                    spec.metric
                )));
            }
            _ => {}
        }

        if !seen.insert(spec.metric) {
            return Err(StatsError::Config(format!(
                "metric {} is listed more than once",
                spec.metric
            )));
        }
    }

    Ok(())
}

/// Starter metrics must be unique and must not shadow a team-level metric.
pub fn validate_starters(starters: &[StarterSpec], team: &[MetricSpec]) -> Result<()> {
    let team_metrics: HashSet<CanonicalMetric> = team.iter().map(|s| s.metric).collect();
    let mut seen = HashSet::new();
    for starter in starters {
        if team_metrics.contains(&starter.metric) || !seen.insert(starter.metric) {
            return Err(StatsError::Config(format!(
                "starter metric {} is defined more than once",
                starter.metric
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_tables_are_valid() {
        validate_table(TEAM_STAT_METRICS).unwrap();
        validate_starters(STARTER_METRICS, TEAM_STAT_METRICS).unwrap();
    }

    #[test]
    fn test_forward_reference_rejected() {
        let table = [
            spec(M::DefensiveSacksPerGame, Derivation::DuplicateOf(M::SacksPerGame), Three),
            spec(M::SacksPerGame, per_game(&["sacks"]), Three),
        ];
        let err = validate_table(&table).unwrap_err();
        assert!(err.to_string().contains("not resolved earlier"));
    }

    #[test]
    fn test_self_reference_rejected() {
        let table = [spec(M::SacksPerGame, Derivation::DuplicateOf(M::SacksPerGame), Three)];
        assert!(validate_table(&table).is_err());
    }

    #[test]
    fn test_differential_metric_operand_must_precede() {
        let table = [
            spec(
                M::TurnoverDifferentialPerGame,
                Derivation::Differential {
                    plus: Operand::Metric(M::TakeawaysPerGame),
                    minus: Operand::Raw(AliasSet::new(&["totalGiveaways"])),
                },
                Three,
            ),
            spec(M::TakeawaysPerGame, per_game(&["totalTakeaways"]), Three),
        ];
        assert!(validate_table(&table).is_err());
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let table = [
            spec(M::SacksPerGame, per_game(&["sacks"]), Three),
            spec(M::SacksPerGame, per_game(&["defensiveSacks"]), Three),
        ];
        let err = validate_table(&table).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_non_finite_constant_rejected() {
        let table = [spec(M::LeagueQbRating, Derivation::Constant(f64::NAN), Two)];
        assert!(validate_table(&table).is_err());
    }

    #[test]
    fn test_starter_shadowing_rejected() {
        let starters = [StarterSpec {
            metric: M::FieldGoalPct,
            position: Position::Kicker,
            aliases: AliasSet::new(&["fieldGoalPct"]),
            precision: Two,
        }];
        assert!(validate_starters(&starters, TEAM_STAT_METRICS).is_err());
    }
}
