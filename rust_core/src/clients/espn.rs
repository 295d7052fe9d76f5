//! ESPN endpoints: scoreboard matchups, team statistics, depth charts and
//! athlete season statistics.
//!
//! URL builders and payload parsing are plain functions; the async helpers
//! only glue them to a `StatsFetcher`.

use super::StatsFetcher;
use crate::models::{HomeAway, Matchup, Position};
use crate::normalize::{flatten, RawStatBag};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info};

pub const SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard";
pub const CORE_API_BASE: &str = "https://sports.core.api.espn.com/v2/sports/football/leagues/nfl";

pub fn scoreboard_url(date: NaiveDate) -> String {
    format!("{}?dates={}", SCOREBOARD_URL, date.format("%Y%m%d"))
}

pub fn team_statistics_url(season: i32, season_type: u8, espn_id: u32) -> String {
    format!(
        "{}/seasons/{}/types/{}/teams/{}/statistics",
        CORE_API_BASE, season, season_type, espn_id
    )
}

pub fn depth_chart_url(espn_id: u32) -> String {
    format!("{}/teams/{}/depthcharts", CORE_API_BASE, espn_id)
}

/// Season statistics URL for an athlete `$ref`. Query strings on the ref
/// (`?lang=en&region=us`) are dropped.
pub fn athlete_statistics_url(athlete_ref: &str, season: i32, season_type: u8) -> String {
    let base = athlete_ref.split('?').next().unwrap_or(athlete_ref);
    format!(
        "{}/statistics/{}/type/{}",
        base.trim_end_matches('/'),
        season,
        season_type
    )
}

/// Two matchups per scoreboard event, home perspective first.
///
/// Events without exactly two competitors, or missing a home or away
/// abbreviation, are skipped.
pub fn parse_scoreboard(data: &Value) -> Vec<Matchup> {
    let mut matchups = Vec::new();

    let Some(events) = data["events"].as_array() else {
        return matchups;
    };

    for event in events {
        let game_id = match &event["id"] {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };

        let Some(competitors) = event["competitions"][0]["competitors"].as_array() else {
            continue;
        };
        if competitors.len() != 2 {
            continue;
        }

        let abbr_for = |side: &str| {
            competitors
                .iter()
                .find(|c| c["homeAway"].as_str() == Some(side))
                .and_then(|c| c["team"]["abbreviation"].as_str())
                .filter(|a| !a.is_empty())
                .map(str::to_string)
        };
        let (Some(home), Some(away)) = (abbr_for("home"), abbr_for("away")) else {
            continue;
        };

        matchups.push(Matchup {
            game_id: game_id.clone(),
            team: home.clone(),
            opponent: away.clone(),
            home_away: HomeAway::Home,
        });
        matchups.push(Matchup {
            game_id,
            team: away,
            opponent: home,
            home_away: HomeAway::Away,
        });
    }

    matchups
}

/// Scheduled matchups for `date`. A failed fetch yields none.
pub async fn fetch_matchups(fetcher: &dyn StatsFetcher, date: NaiveDate) -> Vec<Matchup> {
    let url = scoreboard_url(date);
    let matchups = match fetcher.fetch_json(&url).await {
        Some(data) => parse_scoreboard(&data),
        None => Vec::new(),
    };
    info!(date = %date, rows = matchups.len(), "Fetched scoreboard matchups");
    matchups
}

/// Flattened team statistics, or `None` when the payload is missing.
pub async fn fetch_team_statistics(
    fetcher: &dyn StatsFetcher,
    season: i32,
    season_type: u8,
    espn_id: u32,
) -> Option<RawStatBag> {
    let url = team_statistics_url(season, season_type, espn_id);
    fetcher.fetch_json(&url).await.map(|data| flatten(&data))
}

/// Flattened season statistics for one athlete.
pub async fn fetch_athlete_statistics(
    fetcher: &dyn StatsFetcher,
    athlete_ref: &str,
    season: i32,
    season_type: u8,
) -> Option<RawStatBag> {
    let url = athlete_statistics_url(athlete_ref, season, season_type);
    fetcher.fetch_json(&url).await.map(|data| flatten(&data))
}

fn ref_of(node: &Value) -> Option<&str> {
    node["$ref"]
        .as_str()
        .or_else(|| node["href"].as_str())
        .filter(|r| !r.is_empty())
}

/// A chart entry carries content when it has anything beyond a reference.
fn is_reference_only(node: &Value) -> bool {
    node.as_object()
        .map(|obj| obj.keys().all(|k| k == "$ref" || k == "href"))
        .unwrap_or(false)
}

/// Every depth chart for a team, with `items[].$ref` entries resolved.
///
/// Unresolvable references are dropped; inline charts are kept as-is.
pub async fn fetch_depth_charts(fetcher: &dyn StatsFetcher, espn_id: u32) -> Vec<Value> {
    let Some(root) = fetcher.fetch_json(&depth_chart_url(espn_id)).await else {
        return Vec::new();
    };
    let Some(items) = root["items"].as_array() else {
        return Vec::new();
    };

    let mut charts = Vec::with_capacity(items.len());
    for item in items {
        match ref_of(item) {
            Some(chart_ref) if is_reference_only(item) => {
                if let Some(chart) = fetcher.fetch_json(chart_ref).await {
                    charts.push(chart);
                } else {
                    debug!(chart_ref, "Depth chart reference did not resolve");
                }
            }
            _ => charts.push(item.clone()),
        }
    }
    charts
}

fn position_label(node: &Value) -> Option<&str> {
    node.as_str()
        .or_else(|| node["abbreviation"].as_str())
        .or_else(|| node["name"].as_str())
}

fn first_athlete_ref(slots: &Value) -> Option<String> {
    slots
        .as_array()?
        .iter()
        .find_map(|slot| ref_of(&slot["athlete"]))
        .map(str::to_string)
}

/// First-listed athlete `$ref` for `position` across the given charts.
///
/// Two chart shapes are understood: a `positions` map keyed by position
/// (each with `position` and `athletes`), and a flat chart with a
/// `position`/`positionAbbreviation` label and `items`/`slots`.
pub fn starter_ref(charts: &[Value], position: Position) -> Option<String> {
    for chart in charts {
        if let Some(positions) = chart["positions"].as_object() {
            for (key, entry) in positions {
                let label = position_label(&entry["position"]).unwrap_or(key.as_str());
                if position.matches_label(label) {
                    if let Some(r) = first_athlete_ref(&entry["athletes"]) {
                        return Some(r);
                    }
                }
            }
            continue;
        }

        let label = position_label(&chart["position"])
            .or_else(|| chart["positionAbbreviation"].as_str())
            .unwrap_or("");
        if !position.matches_label(label) {
            continue;
        }
        let slots = if chart["items"].is_array() {
            &chart["items"]
        } else {
            &chart["slots"]
        };
        if let Some(r) = first_athlete_ref(slots) {
            return Some(r);
        }
    }
    None
}
