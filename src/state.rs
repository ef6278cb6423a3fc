use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    http: reqwest::Client,
    page_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Fails when the HTTP client cannot be built; every request must carry
    /// the configured timeout.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("strava-dash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http,
            page_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Held for the duration of a page load.
    pub fn page_lock(&self) -> &Mutex<()> {
        &self.page_lock
    }
}
