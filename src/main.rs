use axum::Router;
use strava_dash::{config, routes, state};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strava_dash=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();
    let port = config.port;
    tracing::info!("Reading credentials from {}", config.credentials_path.display());
    let state = match state::AppState::new(config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Failed to build HTTP client: {}", err);
            std::process::exit(1);
        }
    };

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::dashboard::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        }
    };

    tracing::info!("strava-dash listening on {}", addr);
    tracing::info!("Dashboard: http://{}/", addr);
    tracing::info!("Dashboard JSON: GET http://{}/api/dashboard", addr);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
        std::process::exit(1);
    }
}
