//! Applies a metric table to a flattened stat bag.

use super::table::{Derivation, Divisor, MetricSpec, Operand, StarterSpec, GAMES_PLAYED};
use super::TeamMetricsRow;
use crate::normalize::{per_game, resolve, RawStatBag};

/// Resolve every entry of `table` against one team's bag, in table order.
///
/// Entries whose inputs are missing are left out of the row. Only
/// `DuplicateOf` and metric operands read from the row being built, so
/// table order must already satisfy `validate_table`.
pub fn derive_team_metrics(bag: &RawStatBag, table: &[MetricSpec]) -> TeamMetricsRow {
    let games = resolve(bag, GAMES_PLAYED);
    let mut row = TeamMetricsRow::new();

    for spec in table {
        let precision = spec.precision;
        let value = match spec.derivation {
            Derivation::Direct(aliases) | Derivation::Percentage(aliases) => {
                resolve(bag, aliases).map(|v| precision.round(v))
            }
            Derivation::PerGame { rate, total, games: divisor } => rate
                .and_then(|r| resolve(bag, r))
                .map(|v| precision.round(v))
                .or_else(|| {
                    let divisor = match divisor {
                        Divisor::TeamGames => games,
                        Divisor::Split(aliases) => resolve(bag, aliases),
                    };
                    per_game(resolve(bag, total), divisor, precision)
                }),
            Derivation::Differential { plus, minus } => {
                match (operand(bag, &row, plus), operand(bag, &row, minus)) {
                    (Some(p), Some(m)) => per_game(Some(p - m), games, precision),
                    _ => None,
                }
            }
            Derivation::DuplicateOf(source) => row.get(source),
            Derivation::Constant(v) => Some(precision.round(v)),
        };
        row.set(spec.metric, value);
    }

    row
}

fn operand(bag: &RawStatBag, row: &TeamMetricsRow, op: Operand) -> Option<f64> {
    match op {
        Operand::Raw(aliases) => resolve(bag, aliases),
        Operand::Metric(metric) => row.get(metric),
    }
}

/// Resolve one starter metric from a player's flattened season stats.
pub fn derive_starter_metric(bag: &RawStatBag, spec: &StarterSpec) -> Option<f64> {
    resolve(bag, spec.aliases).map(|v| spec.precision.round(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CanonicalMetric, STARTER_METRICS, TEAM_STAT_METRICS};
    use crate::normalize::flatten;
    use serde_json::json;

    fn bag(pairs: &[(&str, serde_json::Value)]) -> RawStatBag {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    #[test]
    fn test_turnover_differential() {
        let raw = bag(&[
            ("totalTakeaways", json!(20)),
            ("totalGiveaways", json!(12)),
            ("gamesPlayed", json!(10)),
        ]);
        let row = derive_team_metrics(&raw, TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::TurnoverDifferentialPerGame), Some(0.8));
        assert_eq!(row.get(CanonicalMetric::TakeawaysPerGame), Some(2.0));
    }

    #[test]
    fn test_team_games_alias_priority() {
        let raw = bag(&[
            ("sacks", json!(30)),
            ("teamGamesPlayed", json!(15)),
            ("gamesPlayed", json!(10)),
        ]);
        let row = derive_team_metrics(&raw, TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::SacksPerGame), Some(2.0));
    }

    #[test]
    fn test_missing_games_played_leaves_rates_absent() {
        let raw = bag(&[("sacks", json!(30)), ("completionPct", json!(61.234))]);
        let row = derive_team_metrics(&raw, TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::SacksPerGame), None);
        assert_eq!(row.get(CanonicalMetric::DefensiveSacksPerGame), None);
        assert_eq!(row.get(CanonicalMetric::CompletionPct), Some(61.23));
    }

    #[test]
    fn test_zero_games_played() {
        let raw = bag(&[
            ("totalTakeaways", json!(3)),
            ("totalGiveaways", json!(1)),
            ("gamesPlayed", json!(0)),
        ]);
        let row = derive_team_metrics(&raw, TEAM_STAT_METRICS);
        assert!(!row.contains(CanonicalMetric::TurnoverDifferentialPerGame));
        assert!(!row.contains(CanonicalMetric::TakeawaysPerGame));
    }

    #[test]
    fn test_rate_preferred_over_total() {
        let raw = bag(&[
            ("firstDownsPerGame", json!(21.456)),
            ("firstDowns", json!(100)),
            ("gamesPlayed", json!(4)),
        ]);
        let row = derive_team_metrics(&raw, TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::FirstDownsPerGame), Some(21.46));

        let raw = bag(&[("firstDowns", json!(100)), ("gamesPlayed", json!(4))]);
        let row = derive_team_metrics(&raw, TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::FirstDownsPerGame), Some(25.0));
    }

    #[test]
    fn test_duplicates_follow_source() {
        let raw = bag(&[
            ("sacks", json!(25)),
            ("totalPenalties", json!(61)),
            ("gamesPlayed", json!(9)),
        ]);
        let row = derive_team_metrics(&raw, TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::SacksPerGame), Some(2.778));
        assert_eq!(
            row.get(CanonicalMetric::DefensiveSacksPerGame),
            row.get(CanonicalMetric::SacksPerGame)
        );
        assert_eq!(row.get(CanonicalMetric::PenaltiesPerGame), Some(6.778));
        assert_eq!(
            row.get(CanonicalMetric::DefensivePenaltiesPerGame),
            row.get(CanonicalMetric::PenaltiesPerGame)
        );
    }

    #[test]
    fn test_home_road_use_split_divisors() {
        let raw = bag(&[
            ("pointsForHome", json!(110)),
            ("homeGames", json!(4)),
            ("roadPointsFor", json!(95)),
            ("gamesPlayedAway", json!(5)),
            ("gamesPlayed", json!(9)),
        ]);
        let row = derive_team_metrics(&raw, TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::HomePointsPerGame), Some(27.5));
        assert_eq!(row.get(CanonicalMetric::RoadPointsPerGame), Some(19.0));
    }

    #[test]
    fn test_constant_always_present() {
        let row = derive_team_metrics(&RawStatBag::new(), TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::LeagueQbRating), Some(90.0));
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_flattened_payload_end_to_end() {
        let payload = json!({
            "splits": {"categories": [
                {"name": "general", "stats": [
                    {"name": "gamesPlayed", "value": 8},
                    {"name": "fumblesLost", "value": 5},
                    {"name": "totalPenaltyYards", "value": 412}
                ]},
                {"name": "passing", "stats": [
                    {"name": "passingYardsPerGame", "value": 231.875},
                    {"name": "interceptions", "value": 7}
                ]}
            ]}
        });
        let row = derive_team_metrics(&flatten(&payload), TEAM_STAT_METRICS);
        assert_eq!(row.get(CanonicalMetric::FumblesLostPerGame), Some(0.625));
        assert_eq!(row.get(CanonicalMetric::PenaltyYardsPerGame), Some(51.5));
        assert_eq!(row.get(CanonicalMetric::PassingYardsPerGame), Some(231.88));
        assert_eq!(row.get(CanonicalMetric::InterceptionsThrownPerGame), Some(0.875));
    }

    #[test]
    fn test_starter_metric() {
        let kicker = STARTER_METRICS
            .iter()
            .find(|s| s.metric == CanonicalMetric::StarterKickerFgPct)
            .unwrap();
        let raw = bag(&[("fieldGoalPct", json!(86.6667))]);
        assert_eq!(derive_starter_metric(&raw, kicker), Some(86.67));
        assert_eq!(derive_starter_metric(&RawStatBag::new(), kicker), None);
    }
}
