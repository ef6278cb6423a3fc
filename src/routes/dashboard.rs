use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::error::AppError;
use crate::pipeline::{dashboard, render};
use crate::state::AppState;
use crate::types::dashboard::{Dashboard, PageOutcome};

const NO_ACTIVITIES: &str = "No activities found.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/dashboard", get(dashboard_json))
}

async fn dashboard_page(State(state): State<AppState>) -> Response {
    match dashboard::load(&state, Utc::now()).await {
        Ok(PageOutcome::Ready(dashboard)) => {
            html(StatusCode::OK, render::render_dashboard(&dashboard))
        }
        Ok(PageOutcome::NoActivities { notices }) => {
            html(StatusCode::OK, render::render_notice_page(&notices, NO_ACTIVITIES))
        }
        Err(err) => {
            tracing::error!("Dashboard render halted: {}", err);
            html(err.status(), render::render_error(&err.to_string()))
        }
    }
}

fn html(status: StatusCode, rendered: Result<String, askama::Error>) -> Response {
    match rendered {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => {
            tracing::error!("Template render failed: {}", err);
            AppError::from(err).into_response()
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum DashboardResponse {
    Ready(Dashboard),
    Empty {
        notices: Vec<String>,
        message: &'static str,
    },
}

async fn dashboard_json(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let response = match dashboard::load(&state, Utc::now()).await {
        Ok(PageOutcome::Ready(dashboard)) => DashboardResponse::Ready(dashboard),
        Ok(PageOutcome::NoActivities { notices }) => DashboardResponse::Empty {
            notices,
            message: NO_ACTIVITIES,
        },
        Err(err) => {
            tracing::error!("Dashboard request halted: {}", err);
            return Err(err);
        }
    };

    Ok(Json(response))
}
