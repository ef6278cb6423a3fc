use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::fs;

use crate::error::ConfigError;

/// OAuth client credentials plus the cached token state, stored as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Strava hands out numeric client ids; both `12345` and `"12345"` load.
    #[serde(deserialize_with = "string_or_integer")]
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: String,
    /// Unix seconds. A file without it is treated as already expired.
    #[serde(default)]
    pub expires_at: i64,
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Integer(value) => value.to_string(),
    })
}

pub async fn load(path: &Path) -> Result<Credentials, ConfigError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Rewrites the whole file. Single-writer use only.
pub async fn save(path: &Path, credentials: &Credentials) -> Result<(), ConfigError> {
    let payload = toml::to_string(credentials)?;
    fs::write(path, payload)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}
