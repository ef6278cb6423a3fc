use serde::Deserialize;

use crate::credentials::Credentials;
use crate::error::TokenRefreshError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_at: i64,
}

/// A token whose expiry is now or in the past must be refreshed before use.
pub fn needs_refresh(expires_at: i64, now: i64) -> bool {
    expires_at <= now
}

/// Exchanges the stored refresh token for a new access token. The provider
/// rotates the refresh token, so the returned credentials must be persisted.
pub async fn refresh(
    client: &reqwest::Client,
    token_url: &str,
    mut credentials: Credentials,
) -> Result<Credentials, TokenRefreshError> {
    let response = client
        .post(token_url)
        .form(&[
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await
        .map_err(TokenRefreshError::Transport)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(TokenRefreshError::Status { status, body });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(TokenRefreshError::Decode)?;

    credentials.access_token = token.access_token;
    credentials.refresh_token = token.refresh_token;
    credentials.expires_at = token.expires_at;

    tracing::info!("Access token refreshed, expires at {}", credentials.expires_at);

    Ok(credentials)
}
