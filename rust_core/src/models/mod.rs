//! Shared domain types: roster, positions, matchups and season inference.

pub mod roster;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use roster::{get_team, Team, NFL_TEAMS};

/// ESPN season type for the regular season.
pub const REGULAR_SEASON: u8 = 2;

/// Depth-chart positions we pull a starter for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    Kicker,
}

impl Position {
    /// Abbreviation used in ESPN depth chart labels
    pub fn abbr(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::Kicker => "K",
        }
    }

    /// Whether a depth-chart position label refers to this position.
    ///
    /// Labels are free text ("QB", "Quarterback", "PK"); matching is on
    /// whole tokens so "K" does not match "WR/KR".
    pub fn matches_label(&self, label: &str) -> bool {
        let upper = label.trim().to_uppercase();
        let full = match self {
            Position::Quarterback => "QUARTERBACK",
            Position::RunningBack => "RUNNING BACK",
            Position::WideReceiver => "WIDE RECEIVER",
            Position::Kicker => "PLACE KICKER",
        };
        if upper == full || (*self == Position::Kicker && upper == "KICKER") {
            return true;
        }
        upper
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|tok| tok == self.abbr() || (*self == Position::Kicker && tok == "PK"))
    }
}

/// Which side of a matchup a team is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomeAway {
    Home,
    Away,
}

impl HomeAway {
    pub fn code(&self) -> &'static str {
        match self {
            HomeAway::Home => "H",
            HomeAway::Away => "A",
        }
    }
}

impl fmt::Display for HomeAway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One team's view of a scheduled game. Each game yields two matchups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub game_id: String,
    pub team: String,
    pub opponent: String,
    pub home_away: HomeAway,
}

/// Season year and ESPN season type for a calendar date.
///
/// January and February games belong to the season that started the
/// previous calendar year.
pub fn season_for(date: NaiveDate) -> (i32, u8) {
    let year = if date.month() <= 2 {
        date.year() - 1
    } else {
        date.year()
    };
    (year, REGULAR_SEASON)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_season_for() {
        assert_eq!(season_for(date(2025, 11, 2)), (2025, 2));
        assert_eq!(season_for(date(2026, 1, 11)), (2025, 2));
        assert_eq!(season_for(date(2026, 2, 28)), (2025, 2));
        assert_eq!(season_for(date(2026, 3, 1)), (2026, 2));
    }

    #[test]
    fn test_position_labels() {
        assert!(Position::Quarterback.matches_label("QB"));
        assert!(Position::Quarterback.matches_label(" quarterback "));
        assert!(Position::Kicker.matches_label("PK"));
        assert!(Position::Kicker.matches_label("Place Kicker"));
        assert!(Position::Kicker.matches_label("K"));
        assert!(!Position::Kicker.matches_label("WR/KR"));
        assert!(Position::WideReceiver.matches_label("WR/KR"));
        assert!(!Position::RunningBack.matches_label("FB"));
    }

    #[test]
    fn test_home_away_codes() {
        assert_eq!(HomeAway::Home.to_string(), "H");
        assert_eq!(HomeAway::Away.code(), "A");
    }
}
