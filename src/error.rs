use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{} not found in workspace root", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TokenRefreshError {
    #[error("request to token endpoint failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid token response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Strava returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PolylineError {
    #[error("Polyline ended in the middle of a value at byte {0}")]
    Truncated(usize),
    #[error("Invalid polyline character {1:?} at byte {0}")]
    InvalidChar(usize, char),
    #[error("Polyline value overflows at byte {0}")]
    Overflow(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Token refresh failed: {0}")]
    TokenRefresh(#[from] TokenRefreshError),
    #[error("Failed to fetch activities: {0}")]
    Activities(#[source] ApiError),
    #[error("Failed to fetch activity {id}: {source}")]
    Activity {
        id: u64,
        #[source]
        source: ApiError,
    },
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TokenRefresh(_) | AppError::Activities(_) | AppError::Activity { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
