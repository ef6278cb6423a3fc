use serde::Serialize;
use serde_json::Value;

use crate::types::activity::RoutePoint;

/// Everything the presentation layer needs for one page load.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub notices: Vec<String>,
    pub year_to_date: YearToDate,
    pub latest_run: Option<LatestRun>,
    pub chart: Vec<ChartRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearToDate {
    pub distance_km: f64,
    pub moving_minutes: f64,
    pub avg_speed_kmh: Option<f64>,
    pub run_count: usize,
    pub target_today_km: f64,
    pub remaining_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestRun {
    pub id: u64,
    pub summary: ActivitySummary,
    pub route: Option<Route>,
    /// Detail payload exactly as the API returned it.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub name: String,
    pub distance_km: f64,
    pub moving_minutes: f64,
    pub elapsed_minutes: f64,
    pub avg_speed_kmh: Option<f64>,
    pub elevation_gain_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunTotals {
    pub distance_km: f64,
    pub moving_minutes: f64,
    pub avg_speed_kmh: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub label: &'static str,
    pub segment: &'static str,
    pub kms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub points: Vec<RoutePoint>,
    pub centroid: RoutePoint,
}

/// Result of a page load that did not fail.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Ready(Dashboard),
    NoActivities { notices: Vec<String> },
}
