use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, TimeZone, Utc};

pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
/// Largest page the activity list endpoint will return.
pub const MAX_PER_PAGE: u32 = 200;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub credentials_path: PathBuf,
    pub api_base: String,
    pub token_url: String,
    pub annual_target_km: f64,
    pub per_page: u32,
    /// Lower bound (unix seconds) for the activity list. `None` means
    /// January 1st of the current UTC year, resolved per page load.
    pub activities_after: Option<i64>,
    /// Page forward until the `after` window is exhausted instead of
    /// stopping after the first page.
    pub fetch_all_pages: bool,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8501,
            credentials_path: PathBuf::from("config.toml"),
            api_base: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            annual_target_km: 2000.0,
            per_page: 30,
            activities_after: None,
            fetch_all_pages: false,
            http_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let credentials_path = std::env::var("CREDENTIALS_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.credentials_path);

        let api_base = std::env::var("STRAVA_API_BASE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);

        let token_url = std::env::var("STRAVA_TOKEN_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.token_url);

        let annual_target_km = std::env::var("ANNUAL_TARGET_KM")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|km| km.is_finite() && *km >= 0.0)
            .unwrap_or(defaults.annual_target_km);

        let per_page = per_page_setting(std::env::var("ACTIVITIES_PER_PAGE").ok().as_deref())
            .unwrap_or(defaults.per_page);

        let activities_after = std::env::var("ACTIVITIES_AFTER")
            .ok()
            .and_then(|s| s.parse().ok());

        let fetch_all_pages = std::env::var("FETCH_ALL_PAGES")
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.fetch_all_pages);

        let http_timeout_seconds = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(15);

        Self {
            port,
            credentials_path,
            api_base,
            token_url,
            annual_target_km,
            per_page,
            activities_after,
            fetch_all_pages,
            http_timeout: Duration::from_secs(http_timeout_seconds),
        }
    }

    pub fn activities_after_or_year_start(&self) -> i64 {
        self.activities_after.unwrap_or_else(start_of_current_year)
    }
}

/// Page size actually requested, capped at what Strava serves so a short page
/// still means the window is exhausted.
pub fn effective_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_PER_PAGE)
}

fn per_page_setting(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .map(effective_per_page)
}

fn start_of_current_year() -> i64 {
    let year = Utc::now().year();
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}
