//! Pro-Football-Reference team season pages.

use super::StatsFetcher;

pub const PFR_BASE: &str = "https://www.pro-football-reference.com";

pub fn season_page_url(slug: &str, season: i32) -> String {
    format!("{}/teams/{}/{}.htm", PFR_BASE, slug, season)
}

/// Raw markup of a team's season page (schedule & game results).
pub async fn fetch_season_page(fetcher: &dyn StatsFetcher, slug: &str, season: i32) -> Option<String> {
    fetcher.fetch_html(&season_page_url(slug, season)).await
}
