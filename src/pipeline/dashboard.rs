use chrono::{DateTime, Local, Utc};

use crate::config::effective_per_page;
use crate::credentials::{self, Credentials};
use crate::error::AppError;
use crate::pipeline::{polyline, stats};
use crate::state::AppState;
use crate::strava::api::{self, ActivityQuery};
use crate::strava::oauth;
use crate::types::activity::Activity;
use crate::types::dashboard::{Dashboard, LatestRun, PageOutcome, Route, YearToDate};

/// Runs one page load: credentials, token refresh, fetch, derive.
///
/// Any error halts the load; nothing from a partially completed run is
/// returned. Page loads are serialized so the credentials file sees a single
/// reader-writer at a time.
pub async fn load(state: &AppState, now: DateTime<Utc>) -> Result<PageOutcome, AppError> {
    let _page = state.page_lock().lock().await;
    let config = state.config();
    let mut notices = Vec::new();

    let credentials = credentials::load(&config.credentials_path).await?;
    let credentials = ensure_fresh_token(state, credentials, now, &mut notices).await?;

    let query = ActivityQuery {
        per_page: effective_per_page(config.per_page),
        page: 1,
        after: config.activities_after_or_year_start(),
    };
    let token = credentials.access_token.as_str();
    let listing = if config.fetch_all_pages {
        api::list_all_activities(state.http(), &config.api_base, token, query).await
    } else {
        api::list_activities(state.http(), &config.api_base, token, query).await
    };
    let activities = listing.map_err(AppError::Activities)?;

    tracing::info!("Fetched {} activities", activities.len());

    if activities.is_empty() {
        return Ok(PageOutcome::NoActivities { notices });
    }

    let totals = stats::run_totals(&activities);
    let today = now.with_timezone(&Local).date_naive();
    let target_today_km = stats::ytd_target_km(config.annual_target_km, today);
    let remaining_km = stats::remaining_to_target(target_today_km, totals.distance_km);

    let latest_run = match activities.iter().find(|a| a.is_run()) {
        Some(latest) => Some(fetch_latest_run(state, latest, token).await?),
        None => None,
    };

    Ok(PageOutcome::Ready(Dashboard {
        notices,
        chart: stats::chart_rows(totals.distance_km, remaining_km),
        year_to_date: YearToDate {
            distance_km: totals.distance_km,
            moving_minutes: totals.moving_minutes,
            avg_speed_kmh: totals.avg_speed_kmh,
            run_count: totals.count,
            target_today_km,
            remaining_km,
        },
        latest_run,
    }))
}

async fn ensure_fresh_token(
    state: &AppState,
    credentials: Credentials,
    now: DateTime<Utc>,
    notices: &mut Vec<String>,
) -> Result<Credentials, AppError> {
    if !oauth::needs_refresh(credentials.expires_at, now.timestamp()) {
        return Ok(credentials);
    }

    tracing::info!("Access token expired at {}, refreshing", credentials.expires_at);
    let config = state.config();
    let refreshed = oauth::refresh(state.http(), &config.token_url, credentials)
        .await
        .map_err(|err| {
            tracing::error!("Token refresh failed: {}", err);
            err
        })?;
    credentials::save(&config.credentials_path, &refreshed).await?;
    notices.push("Token refreshed".to_string());

    Ok(refreshed)
}

async fn fetch_latest_run(
    state: &AppState,
    latest: &Activity,
    access_token: &str,
) -> Result<LatestRun, AppError> {
    let (detail, raw) = api::get_activity(
        state.http(),
        &state.config().api_base,
        latest.id,
        access_token,
    )
    .await
    .map_err(|source| AppError::Activity {
        id: latest.id,
        source,
    })?;

    Ok(LatestRun {
        id: detail.id,
        summary: stats::activity_summary(&detail),
        route: route_of(&detail),
        raw,
    })
}

/// Decoded route of an activity. A missing or unreadable polyline just
/// means there is nothing to draw.
fn route_of(activity: &Activity) -> Option<Route> {
    let encoded = activity.route_polyline()?;
    let points = match polyline::decode(encoded) {
        Ok(points) => points,
        Err(err) => {
            tracing::warn!("Ignoring route of activity {}: {}", activity.id, err);
            return None;
        }
    };
    let centroid = polyline::centroid(&points)?;
    Some(Route { points, centroid })
}
