use chrono::{Datelike, NaiveDate};

use crate::types::activity::Activity;
use crate::types::dashboard::{ActivitySummary, ChartRow, RunTotals};

const METERS_PER_KM: f64 = 1000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;
const MPS_TO_KMH: f64 = 3.6;

/// Linear share of the annual target that should be done by `today`.
/// Jan 1 yields 0 and Dec 31 yields the full target.
pub fn ytd_target_km(annual_target_km: f64, today: NaiveDate) -> f64 {
    let days_elapsed = today.ordinal0() as f64;
    let days_span = last_day_of_year(today.year()).ordinal0() as f64;
    annual_target_km * days_elapsed / days_span
}

fn last_day_of_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
}

pub fn run_totals(activities: &[Activity]) -> RunTotals {
    let mut distance_m = 0.0;
    let mut moving_s = 0u64;
    let mut speed_sum = 0.0;
    let mut speed_count = 0usize;
    let mut count = 0usize;

    for activity in activities.iter().filter(|a| a.is_run()) {
        count += 1;
        distance_m += activity.distance;
        moving_s += activity.moving_time;
        if let Some(speed) = activity.average_speed {
            speed_sum += speed;
            speed_count += 1;
        }
    }

    RunTotals {
        distance_km: distance_m / METERS_PER_KM,
        moving_minutes: moving_s as f64 / SECONDS_PER_MINUTE,
        avg_speed_kmh: if speed_count > 0 {
            Some(speed_sum / speed_count as f64 * MPS_TO_KMH)
        } else {
            None
        },
        count,
    }
}

pub fn activity_summary(activity: &Activity) -> ActivitySummary {
    ActivitySummary {
        name: activity
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Activity".to_string()),
        distance_km: activity.distance / METERS_PER_KM,
        moving_minutes: activity.moving_time as f64 / SECONDS_PER_MINUTE,
        elapsed_minutes: activity.elapsed_time as f64 / SECONDS_PER_MINUTE,
        // A zero speed means the provider had nothing to report.
        avg_speed_kmh: activity
            .average_speed
            .filter(|speed| *speed > 0.0)
            .map(|speed| speed * MPS_TO_KMH),
        elevation_gain_m: activity.total_elevation_gain,
    }
}

pub fn remaining_to_target(target_today_km: f64, actual_km: f64) -> f64 {
    (target_today_km - actual_km).max(0.0)
}

/// Rows for the stacked YTD bar: what was run, then what is still missing.
pub fn chart_rows(actual_km: f64, remaining_km: f64) -> Vec<ChartRow> {
    vec![
        ChartRow {
            label: "YTD",
            segment: "Actual",
            kms: actual_km,
        },
        ChartRow {
            label: "YTD",
            segment: "Target",
            kms: remaining_km,
        },
    ]
}
