//! Static NFL roster.
//!
//! This module provides:
//! - The read-only team table (abbreviation, ESPN id, Pro-Football-Reference slug)
//! - Lookup helpers by abbreviation

/// One team and its identifiers on each upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    /// ESPN abbreviation, also the output `team` column (e.g., "DAL")
    pub abbr: &'static str,
    /// ESPN core API team id
    pub espn_id: u32,
    /// Pro-Football-Reference URL slug (e.g., "dal", "kan")
    pub pfr_slug: &'static str,
}

const fn team(abbr: &'static str, espn_id: u32, pfr_slug: &'static str) -> Team {
    Team {
        abbr,
        espn_id,
        pfr_slug,
    }
}

/// All 32 teams in fixed processing order.
pub static NFL_TEAMS: &[Team] = &[
    team("ARI", 22, "crd"),
    team("ATL", 1, "atl"),
    team("BAL", 33, "rav"),
    team("BUF", 2, "buf"),
    team("CAR", 29, "car"),
    team("CHI", 3, "chi"),
    team("CIN", 4, "cin"),
    team("CLE", 5, "cle"),
    team("DAL", 6, "dal"),
    team("DEN", 7, "den"),
    team("DET", 8, "det"),
    team("GB", 9, "gnb"),
    team("HOU", 34, "htx"),
    team("IND", 11, "clt"),
    team("JAX", 30, "jax"),
    team("KC", 12, "kan"),
    team("LV", 13, "rai"),
    team("LAC", 24, "sdg"),
    team("LAR", 14, "ram"),
    team("MIA", 15, "mia"),
    team("MIN", 16, "min"),
    team("NE", 17, "nwe"),
    team("NO", 18, "nor"),
    team("NYG", 19, "nyg"),
    team("NYJ", 20, "nyj"),
    team("PHI", 21, "phi"),
    team("PIT", 23, "pit"),
    team("SF", 25, "sfo"),
    team("SEA", 26, "sea"),
    team("TB", 27, "tam"),
    team("TEN", 10, "oti"),
    team("WSH", 28, "was"),
];

/// Get a team by abbreviation (case-insensitive).
pub fn get_team(abbr: &str) -> Option<&'static Team> {
    NFL_TEAMS.iter().find(|t| t.abbr.eq_ignore_ascii_case(abbr))
}
