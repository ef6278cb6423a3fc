use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::activity::Activity;

#[derive(Debug, Clone, Copy)]
pub struct ActivityQuery {
    pub per_page: u32,
    pub page: u32,
    /// Unix seconds; only activities that started after this are listed.
    pub after: i64,
}

pub async fn list_activities(
    client: &reqwest::Client,
    api_base: &str,
    access_token: &str,
    query: ActivityQuery,
) -> Result<Vec<Activity>, ApiError> {
    let url = format!("{}/athlete/activities", api_base);
    let response = client
        .get(&url)
        .bearer_auth(access_token)
        .query(&[
            ("per_page", query.per_page.to_string()),
            ("page", query.page.to_string()),
            ("after", query.after.to_string()),
        ])
        .send()
        .await
        .map_err(ApiError::Transport)?;

    let payload = read_json(response).await?;
    decode(payload)
}

/// Walks pages until one comes back shorter than `per_page`.
pub async fn list_all_activities(
    client: &reqwest::Client,
    api_base: &str,
    access_token: &str,
    first: ActivityQuery,
) -> Result<Vec<Activity>, ApiError> {
    let mut activities = Vec::new();
    let mut query = first;

    loop {
        let page = list_activities(client, api_base, access_token, query).await?;
        let fetched = page.len();
        activities.extend(page);
        tracing::debug!("Fetched page {} ({} activities)", query.page, fetched);

        if fetched < query.per_page as usize {
            break;
        }
        query.page += 1;
    }

    Ok(activities)
}

/// Fetches one activity's detail. The raw payload is returned alongside the
/// typed record so callers can show fields this crate does not model.
pub async fn get_activity(
    client: &reqwest::Client,
    api_base: &str,
    activity_id: u64,
    access_token: &str,
) -> Result<(Activity, Value), ApiError> {
    let url = format!("{}/activities/{}", api_base, activity_id);
    let response = client
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(ApiError::Transport)?;

    let payload = read_json(response).await?;
    let activity = decode(payload.clone())?;
    Ok((activity, payload))
}

async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }

    response
        .json()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|err| ApiError::Decode(err.to_string()))
}
