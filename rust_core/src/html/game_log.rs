//! Game log table locator.
//!
//! Finds a team's schedule/results table inside a noisy season page, keeps
//! only real game rows, tags each row home or away, and summarizes it into
//! per-game metrics.
//!
//! Pages in the wild hide the table inside an HTML comment, repeat header
//! rows mid-table, and rename quarter columns between seasons. All of that is
//! absorbed here; a page without a usable table yields an empty result.

use super::tables::{parse_tables, strip_comment_markers, RawTable};
use crate::metrics::{CanonicalMetric, TeamMetricsRow};
use crate::models::HomeAway;
use crate::normalize::{parse_number, round_to, AliasSet};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const DATE_COLUMN: AliasSet = AliasSet::new(&["Date"]);
const POINTS_COLUMN: AliasSet = AliasSet::new(&["Pts", "Tm", "PF"]);
const LOCATION_COLUMN: AliasSet = AliasSet::new(&["H/A"]);

/// Exact game-date cell format; anything else is a header repeat or footnote.
fn game_date_regex() -> &'static Regex {
    static GAME_DATE: OnceLock<Regex> = OnceLock::new();
    GAME_DATE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("game date pattern is valid")
    })
}

/// Game-log columns a metric can be averaged over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameLogColumn {
    FirstQuarter,
    FourthQuarter,
    OppFirstQuarter,
    OppFourthQuarter,
    Completions,
    PassAttempts,
    RushAttempts,
}

impl GameLogColumn {
    pub fn aliases(&self) -> AliasSet {
        match self {
            GameLogColumn::FirstQuarter => AliasSet::new(&["1st", "1stQ"]),
            GameLogColumn::FourthQuarter => AliasSet::new(&["4th", "4thQ"]),
            GameLogColumn::OppFirstQuarter => AliasSet::new(&["Opp 1st", "Opp1"]),
            GameLogColumn::OppFourthQuarter => AliasSet::new(&["Opp 4th", "Opp4"]),
            GameLogColumn::Completions => AliasSet::new(&["Cmp", "Cmp.1"]),
            GameLogColumn::PassAttempts => AliasSet::new(&["Att", "Att.1"]),
            GameLogColumn::RushAttempts => AliasSet::new(&["Rush Att", "Att.2"]),
        }
    }
}

/// Per-game means taken straight from one column.
pub static GAME_LOG_MEANS: &[(CanonicalMetric, GameLogColumn)] = &[
    (CanonicalMetric::FirstQuarterPointsPerGame, GameLogColumn::FirstQuarter),
    (CanonicalMetric::FourthQuarterPointsPerGame, GameLogColumn::FourthQuarter),
    (CanonicalMetric::FirstQuarterPointsAllowedPerGame, GameLogColumn::OppFirstQuarter),
    (CanonicalMetric::FourthQuarterPointsAllowedPerGame, GameLogColumn::OppFourthQuarter),
    (CanonicalMetric::RushAttemptsPerGame, GameLogColumn::RushAttempts),
    (CanonicalMetric::PassAttemptsPerGame, GameLogColumn::PassAttempts),
    (CanonicalMetric::PassCompletionsPerGame, GameLogColumn::Completions),
];

/// Column positions resolved once when the table is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub points: Option<usize>,
    pub first_quarter: Option<usize>,
    pub fourth_quarter: Option<usize>,
    pub opp_first_quarter: Option<usize>,
    pub opp_fourth_quarter: Option<usize>,
    pub completions: Option<usize>,
    pub pass_attempts: Option<usize>,
    pub rush_attempts: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Self {
        let col = |c: GameLogColumn| table.column(c.aliases().names());
        Self {
            date: table.column(DATE_COLUMN.names()),
            points: table.column(POINTS_COLUMN.names()),
            first_quarter: col(GameLogColumn::FirstQuarter),
            fourth_quarter: col(GameLogColumn::FourthQuarter),
            opp_first_quarter: col(GameLogColumn::OppFirstQuarter),
            opp_fourth_quarter: col(GameLogColumn::OppFourthQuarter),
            completions: col(GameLogColumn::Completions),
            pass_attempts: col(GameLogColumn::PassAttempts),
            rush_attempts: col(GameLogColumn::RushAttempts),
        }
    }

    pub fn get(&self, column: GameLogColumn) -> Option<usize> {
        match column {
            GameLogColumn::FirstQuarter => self.first_quarter,
            GameLogColumn::FourthQuarter => self.fourth_quarter,
            GameLogColumn::OppFirstQuarter => self.opp_first_quarter,
            GameLogColumn::OppFourthQuarter => self.opp_fourth_quarter,
            GameLogColumn::Completions => self.completions,
            GameLogColumn::PassAttempts => self.pass_attempts,
            GameLogColumn::RushAttempts => self.rush_attempts,
        }
    }
}

/// One surviving game row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRow {
    pub cells: Vec<String>,
    pub home_away: HomeAway,
}

/// A cleaned game log: only dated game rows, each tagged home or away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameLogTable {
    pub headers: Vec<String>,
    pub rows: Vec<GameRow>,
    pub columns: ColumnMap,
}

impl GameLogTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Clean a table already known to carry the date + points signature.
    pub fn from_raw(raw: &RawTable) -> Self {
        let columns = ColumnMap::resolve(raw);
        let Some(date_idx) = columns.date else {
            return Self::empty();
        };

        let re = game_date_regex();
        let game_rows: Vec<&Vec<String>> = raw
            .rows
            .iter()
            .filter(|row| row.get(date_idx).is_some_and(|d| re.is_match(d.trim())))
            .collect();

        let location = location_column(raw, &game_rows);
        let rows = game_rows
            .into_iter()
            .map(|cells| GameRow {
                home_away: location
                    .map(|loc| loc.classify(cells))
                    .unwrap_or(HomeAway::Home),
                cells: cells.clone(),
            })
            .collect();

        Self {
            headers: raw.headers.clone(),
            rows,
            columns,
        }
    }

    /// Mean of the numeric cells of a column over rows matching `filter`.
    ///
    /// Non-numeric and missing cells are skipped; no numeric cell -> absent.
    fn mean_where(&self, idx: usize, filter: impl Fn(&GameRow) -> bool) -> Option<f64> {
        let values: Vec<f64> = self
            .rows
            .iter()
            .filter(|r| filter(r))
            .filter_map(|r| r.cells.get(idx).and_then(|c| parse_number(c)))
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn column_mean(&self, column: GameLogColumn) -> Option<f64> {
        self.mean_where(self.columns.get(column)?, |_| true)
    }

    /// Average points scored in home (or road) games.
    pub fn points_mean(&self, side: HomeAway) -> Option<f64> {
        self.mean_where(self.columns.points?, |r| r.home_away == side)
    }

    /// Per-game metrics derived from the cleaned rows, rounded to 2 places.
    pub fn summarize(&self) -> TeamMetricsRow {
        let mut row = TeamMetricsRow::new();
        if self.is_empty() {
            return row;
        }

        for (metric, column) in GAME_LOG_MEANS {
            row.set(*metric, self.column_mean(*column).map(|v| round_to(v, 2)));
        }

        let completions = self.column_mean(GameLogColumn::Completions);
        let attempts = self.column_mean(GameLogColumn::PassAttempts);
        if let (Some(cmp), Some(att)) = (completions, attempts) {
            if att > 0.0 {
                row.insert(CanonicalMetric::GameLogCompletionPct, round_to(cmp / att * 100.0, 2));
            }
        }

        row.set(
            CanonicalMetric::HomePointsPerGame,
            self.points_mean(HomeAway::Home).map(|v| round_to(v, 2)),
        );
        row.set(
            CanonicalMetric::RoadPointsPerGame,
            self.points_mean(HomeAway::Away).map(|v| round_to(v, 2)),
        );
        row
    }
}

/// Where the home/away marker lives in a table.
#[derive(Debug, Clone, Copy)]
enum LocationColumn {
    /// Unnamed column whose literal "@" marks an away game
    Unnamed(usize),
    /// Explicit `H/A` column ("@" or "A" = away)
    Named(usize),
}

impl LocationColumn {
    fn classify(&self, cells: &[String]) -> HomeAway {
        let (idx, away_marks): (usize, &[&str]) = match self {
            LocationColumn::Unnamed(idx) => (*idx, &["@"]),
            LocationColumn::Named(idx) => (*idx, &["@", "A"]),
        };
        match cells.get(idx) {
            Some(cell) if away_marks.contains(&cell.trim()) => HomeAway::Away,
            _ => HomeAway::Home,
        }
    }
}

fn location_column(raw: &RawTable, rows: &[&Vec<String>]) -> Option<LocationColumn> {
    let unnamed = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.is_empty())
        .map(|(idx, _)| idx)
        .find(|idx| {
            rows.iter()
                .any(|row| row.get(*idx).is_some_and(|c| c.trim() == "@"))
        });

    unnamed
        .map(LocationColumn::Unnamed)
        .or_else(|| raw.column(LOCATION_COLUMN.names()).map(LocationColumn::Named))
}

fn qualifies(table: &RawTable) -> bool {
    table.column(DATE_COLUMN.names()).is_some() && table.column(POINTS_COLUMN.names()).is_some()
}

/// Pick the game-log table: date + points columns, most rows, first on ties.
pub fn select_table(tables: &[RawTable]) -> Option<&RawTable> {
    tables
        .iter()
        .filter(|t| qualifies(t))
        .fold(None, |best: Option<&RawTable>, t| match best {
            Some(b) if b.rows.len() >= t.rows.len() => Some(b),
            _ => Some(t),
        })
}

/// Locate, clean and summarize the game log in a season page.
///
/// Structural parse first; only when it finds no qualifying table are
/// comment markers stripped and the page parsed again.
pub fn locate_and_clean(markup: &str) -> (GameLogTable, TeamMetricsRow) {
    let mut tables = parse_tables(markup);
    if select_table(&tables).is_none() {
        debug!("No game log table in live markup, retrying with comments unwrapped");
        tables = parse_tables(&strip_comment_markers(markup));
    }

    match select_table(&tables) {
        Some(raw) => {
            let table = GameLogTable::from_raw(raw);
            let metrics = table.summarize();
            debug!(
                games = table.len(),
                metrics = metrics.len(),
                "Game log table located"
            );
            (table, metrics)
        }
        None => (GameLogTable::empty(), TeamMetricsRow::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_signature_beats_size() {
        let big = raw(&["Player", "Pts"], &[&["a", "1"], &["b", "2"], &["c", "3"]]);
        let log = raw(&["Date", "Pts"], &[&["2025-09-07", "20"]]);
        let tables = vec![big, log.clone()];
        assert_eq!(select_table(&tables), Some(&log));
    }

    #[test]
    fn test_most_rows_then_first() {
        let a = raw(&["Date", "Pts"], &[&["2025-09-07", "20"]]);
        let b = raw(&["Date", "Tm"], &[&["2025-09-07", "20"], &["2025-09-14", "17"]]);
        let c = raw(&["Date", "PF"], &[&["2025-09-07", "3"], &["2025-09-14", "9"]]);
        let tables = vec![a, b.clone(), c];
        assert_eq!(select_table(&tables), Some(&b));
        assert_eq!(select_table(&[]), None);
    }

    #[test]
    fn test_game_date_regex() {
        let re = game_date_regex();
        assert!(re.is_match("2025-09-07"));
        assert!(!re.is_match("2025-9-7"));
        assert!(!re.is_match("Date"));
        assert!(std::ptr::eq(re, game_date_regex()));
    }

    #[test]
    fn test_date_filter() {
        let table = raw(
            &["Date", "Pts"],
            &[
                &["Week 1", "Pts"],
                &["2025-09-07", "24"],
                &["Date", "Pts"],
                &["2025-9-14", "10"],
                &["2025-09-21x", "10"],
                &[" 2025-09-28 ", "31"],
                &["Bye Week"],
            ],
        );
        let log = GameLogTable::from_raw(&table);
        assert_eq!(log.len(), 2);
        assert_eq!(log.rows[0].cells[0], "2025-09-07");
    }

    #[test]
    fn test_away_indicator() {
        let table = raw(
            &["Date", "", "Opp", "Pts"],
            &[
                &["2025-09-07", "@", "PHI", "20"],
                &["2025-09-14", "", "NYG", "40"],
                &["2025-09-21", "vs", "CHI", "30"],
                &["2025-09-28"],
            ],
        );
        let log = GameLogTable::from_raw(&table);
        let sides: Vec<HomeAway> = log.rows.iter().map(|r| r.home_away).collect();
        assert_eq!(
            sides,
            vec![HomeAway::Away, HomeAway::Home, HomeAway::Home, HomeAway::Home]
        );
    }

    #[test]
    fn test_unnamed_column_without_marker_is_not_location() {
        // First unnamed column is a boxscore link; the "@" lives in the second.
        let table = raw(
            &["Date", "", "", "Pts"],
            &[
                &["2025-09-07", "boxscore", "@", "20"],
                &["2025-09-14", "boxscore", "", "27"],
            ],
        );
        let log = GameLogTable::from_raw(&table);
        assert_eq!(log.rows[0].home_away, HomeAway::Away);
        assert_eq!(log.rows[1].home_away, HomeAway::Home);
    }

    #[test]
    fn test_named_location_fallback() {
        let table = raw(
            &["Date", "H/A", "Pts"],
            &[&["2025-09-07", "A", "20"], &["2025-09-14", "H", "27"]],
        );
        let log = GameLogTable::from_raw(&table);
        assert_eq!(log.rows[0].home_away, HomeAway::Away);
        assert_eq!(log.rows[1].home_away, HomeAway::Home);
    }

    #[test]
    fn test_quarter_alias_spellings() {
        let old = raw(&["Date", "Pts", "1stQ", "4thQ"], &[&["2025-09-07", "20", "7", "3"]]);
        let new = raw(&["Date", "Pts", "1st", "4th"], &[&["2025-09-07", "20", "7", "3"]]);
        for table in [old, new] {
            let metrics = GameLogTable::from_raw(&table).summarize();
            assert_eq!(metrics.get(CanonicalMetric::FirstQuarterPointsPerGame), Some(7.0));
            assert_eq!(metrics.get(CanonicalMetric::FourthQuarterPointsPerGame), Some(3.0));
        }
    }

    #[test]
    fn test_summarize() {
        let table = raw(
            &["Date", "", "Pts", "Opp1", "Opp 4th", "Cmp", "Att", "Att.2"],
            &[
                &["2025-09-07", "@", "20", "7", "0", "20", "30", "25"],
                &["2025-09-14", "", "30", "3", "7", "25", "35", "31"],
                &["2025-09-21", "", "17", "0", "", "18", "31", "bad"],
            ],
        );
        let m = GameLogTable::from_raw(&table).summarize();
        assert_eq!(m.get(CanonicalMetric::HomePointsPerGame), Some(23.5));
        assert_eq!(m.get(CanonicalMetric::RoadPointsPerGame), Some(20.0));
        assert_eq!(m.get(CanonicalMetric::FirstQuarterPointsAllowedPerGame), Some(3.33));
        assert_eq!(m.get(CanonicalMetric::FourthQuarterPointsAllowedPerGame), Some(3.5));
        assert_eq!(m.get(CanonicalMetric::PassCompletionsPerGame), Some(21.0));
        assert_eq!(m.get(CanonicalMetric::PassAttemptsPerGame), Some(32.0));
        assert_eq!(m.get(CanonicalMetric::RushAttemptsPerGame), Some(28.0));
        assert_eq!(m.get(CanonicalMetric::GameLogCompletionPct), Some(65.62));
        assert!(!m.contains(CanonicalMetric::FirstQuarterPointsPerGame));
    }

    #[test]
    fn test_all_road_games_leave_home_absent() {
        let table = raw(&["Date", "", "Pts"], &[&["2025-09-07", "@", "20"]]);
        let m = GameLogTable::from_raw(&table).summarize();
        assert_eq!(m.get(CanonicalMetric::RoadPointsPerGame), Some(20.0));
        assert_eq!(m.get(CanonicalMetric::HomePointsPerGame), None);
    }

    #[test]
    fn test_locate_and_clean_comment_fallback() {
        let html = r#"
            <html><body>
              <table><tr><th>Player</th><th>Yds</th></tr><tr><td>x</td><td>1</td></tr></table>
              <div id="all_games"><!--
                <table>
                  <thead><tr><th>Week</th><th>Date</th><th></th><th>Opp</th><th>Pts</th><th>1st</th></tr></thead>
                  <tbody>
                    <tr><th>1</th><td>2025-09-07</td><td>@</td><td>PHI</td><td>20</td><td>7</td></tr>
                    <tr class="thead"><th>Week</th><td>Date</td><td></td><td>Opp</td><td>Pts</td><td>1st</td></tr>
                    <tr><th>2</th><td>2025-09-14</td><td></td><td>NYG</td><td>40</td><td>14</td></tr>
                  </tbody>
                </table>
              --></div>
            </body></html>"#;
        let (table, metrics) = locate_and_clean(html);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].home_away, HomeAway::Away);
        assert_eq!(metrics.get(CanonicalMetric::HomePointsPerGame), Some(40.0));
        assert_eq!(metrics.get(CanonicalMetric::RoadPointsPerGame), Some(20.0));
        assert_eq!(metrics.get(CanonicalMetric::FirstQuarterPointsPerGame), Some(10.5));
    }

    #[test]
    fn test_live_table_preferred_over_commented() {
        let html = r#"
            <table><thead><tr><th>Date</th><th>Pts</th></tr></thead>
              <tbody><tr><td>2025-09-07</td><td>10</td></tr></tbody></table>
            <!-- <table><thead><tr><th>Date</th><th>Pts</th></tr></thead>
              <tbody><tr><td>2025-09-07</td><td>99</td></tr>
                     <tr><td>2025-09-14</td><td>99</td></tr></tbody></table> -->"#;
        let (table, _) = locate_and_clean(html);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].cells[1], "10");
    }

    #[test]
    fn test_no_qualifying_table() {
        let (table, metrics) = locate_and_clean("<p>Nothing here</p><!-- <div>still nothing</div> -->");
        assert!(table.is_empty());
        assert!(metrics.is_empty());
    }
}
