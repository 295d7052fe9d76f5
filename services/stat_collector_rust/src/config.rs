use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use gridiron_core::clients::{BreakerConfig, FetchConfig, RetryPolicy, DEFAULT_USER_AGENT};
use gridiron_core::Families;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub schema_path: PathBuf,
    pub output_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub latest_filename: String,

    /// Slate date; defaults to today in `timezone`
    pub target_date: NaiveDate,
    pub timezone: Tz,

    pub http_timeout: Duration,
    pub fetch_max_attempts: u32,
    pub fetch_base_backoff: Duration,
    pub user_agent: String,

    pub game_log_enabled: bool,
    pub starters_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let schema_path = PathBuf::from(
            env::var("SCHEMA_PATH").unwrap_or_else(|_| "config/fields_schema.csv".to_string()),
        );
        let output_dir =
            PathBuf::from(env::var("OUTPUT_DIR").unwrap_or_else(|_| "data/latest".to_string()));
        let archive_dir =
            PathBuf::from(env::var("ARCHIVE_DIR").unwrap_or_else(|_| "data/archive".to_string()));
        let latest_filename =
            env::var("LATEST_FILENAME").unwrap_or_else(|_| "nfl_latest.csv".to_string());

        let timezone_str = env::var("TIMEZONE").unwrap_or_else(|_| "America/New_York".to_string());
        let timezone = Tz::from_str(&timezone_str).map_err(|_| {
            anyhow!(
                "Invalid TIMEZONE: {} (expected IANA tz like America/New_York)",
                timezone_str
            )
        })?;
        let target_date = parse_date_env("TARGET_DATE", timezone)?;

        let http_timeout = Duration::from_secs(
            parse_u64_env("HTTP_TIMEOUT_SECS", 15).context("HTTP_TIMEOUT_SECS")?,
        );
        let fetch_max_attempts = u32::try_from(
            parse_u64_env("FETCH_MAX_ATTEMPTS", 5).context("FETCH_MAX_ATTEMPTS")?,
        )
        .context("FETCH_MAX_ATTEMPTS out of range")?;
        if fetch_max_attempts == 0 {
            return Err(anyhow!("FETCH_MAX_ATTEMPTS must be at least 1"));
        }
        let fetch_base_backoff = Duration::from_millis(
            parse_u64_env("FETCH_BASE_BACKOFF_MS", 600).context("FETCH_BASE_BACKOFF_MS")?,
        );
        let user_agent = env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        let game_log_enabled = parse_bool_env("GAME_LOG_ENABLED", true)?;
        let starters_enabled = parse_bool_env("STARTERS_ENABLED", true)?;

        Ok(Self {
            schema_path,
            output_dir,
            archive_dir,
            latest_filename,
            target_date,
            timezone,
            http_timeout,
            fetch_max_attempts,
            fetch_base_backoff,
            user_agent,
            game_log_enabled,
            starters_enabled,
        })
    }

    pub fn latest_path(&self) -> PathBuf {
        self.output_dir.join(&self.latest_filename)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: self.http_timeout,
            user_agent: self.user_agent.clone(),
            retry: RetryPolicy {
                max_attempts: self.fetch_max_attempts,
                base_backoff: self.fetch_base_backoff,
                ..Default::default()
            },
            breaker: BreakerConfig::default(),
        }
    }

    pub fn families(&self) -> Families {
        Families {
            team_stats: true,
            game_log: self.game_log_enabled,
            starters: self.starters_enabled,
        }
    }
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(anyhow!("Invalid {key}: {raw} (expected true/false)")),
    }
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid {key}: {raw} (expected integer)"))
}

fn parse_date_env(key: &str, tz: Tz) -> Result<NaiveDate> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid {key}: {raw} (expected YYYY-MM-DD)")),
        _ => Ok(Utc::now().with_timezone(&tz).date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_env() {
        env::set_var("STAT_COLLECTOR_TEST_BOOL", "Yes");
        assert!(parse_bool_env("STAT_COLLECTOR_TEST_BOOL", false).unwrap());
        env::set_var("STAT_COLLECTOR_TEST_BOOL", "off");
        assert!(!parse_bool_env("STAT_COLLECTOR_TEST_BOOL", true).unwrap());
        assert!(parse_bool_env("STAT_COLLECTOR_TEST_BOOL_UNSET", true).unwrap());
    }

    #[test]
    fn test_parse_bool_env_rejects_typo() {
        env::set_var("STAT_COLLECTOR_TEST_BOOL_TYPO", "treu");
        assert!(parse_bool_env("STAT_COLLECTOR_TEST_BOOL_TYPO", true).is_err());
    }

    #[test]
    fn test_max_attempts_out_of_range() {
        env::set_var("FETCH_MAX_ATTEMPTS", "4294967297");
        let err = Config::from_env().unwrap_err();
        env::remove_var("FETCH_MAX_ATTEMPTS");
        assert!(format!("{err:#}").contains("FETCH_MAX_ATTEMPTS"));
    }

    #[test]
    fn test_parse_u64_env() {
        assert_eq!(parse_u64_env("STAT_COLLECTOR_TEST_U64_UNSET", 15).unwrap(), 15);
        env::set_var("STAT_COLLECTOR_TEST_U64", "abc");
        assert!(parse_u64_env("STAT_COLLECTOR_TEST_U64", 15).is_err());
    }

    #[test]
    fn test_parse_date_env() {
        env::set_var("STAT_COLLECTOR_TEST_DATE", "2025-11-02");
        assert_eq!(
            parse_date_env("STAT_COLLECTOR_TEST_DATE", chrono_tz::America::New_York).unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 2).unwrap()
        );
        env::set_var("STAT_COLLECTOR_TEST_DATE_BAD", "11/02/2025");
        assert!(parse_date_env("STAT_COLLECTOR_TEST_DATE_BAD", chrono_tz::UTC).is_err());
    }
}
