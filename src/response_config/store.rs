use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    store::{RecordStore, StoreError},
    types::ResponseConfig,
};

pub const CONFIG_KEY: &str = "webhook:response:config";
pub const MAX_DELAY_MS: u64 = 30_000;

#[derive(Debug, thiserror::Error)]
pub enum ResponseConfigError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode response config: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Wire shape accepted from operators and read back from the store. Every
/// field is optional (explicit `null` included) and numbers are wide so
/// out-of-range values can be normalized instead of rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ResponseConfigInput {
    status_code: Option<i64>,
    headers: Option<BTreeMap<String, String>>,
    body: Option<String>,
    delay: Option<i64>,
}

impl ResponseConfigInput {
    fn normalize(self) -> ResponseConfig {
        let status_code = self
            .status_code
            .and_then(|code| u16::try_from(code).ok())
            .filter(|code| (100..=599).contains(code))
            .unwrap_or(200);
        let delay = self
            .delay
            .and_then(|delay| u64::try_from(delay).ok())
            .filter(|delay| *delay <= MAX_DELAY_MS)
            .unwrap_or(0);

        ResponseConfig {
            status_code,
            headers: self.headers.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            delay,
        }
    }
}

/// The response used whenever no valid config is stored.
pub fn fallback_response_config() -> ResponseConfig {
    ResponseConfig {
        status_code: 200,
        headers: BTreeMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]),
        body: String::new(),
        delay: 0,
    }
}

/// Parses and normalizes a config document. Fails only on malformed JSON.
pub fn decode_response_config(raw: &[u8]) -> Result<ResponseConfig, serde_json::Error> {
    serde_json::from_slice::<ResponseConfigInput>(raw).map(ResponseConfigInput::normalize)
}

/// Current config, or [`fallback_response_config`] if it is missing,
/// unreadable, or corrupt.
pub async fn load_response_config(store: &dyn RecordStore) -> ResponseConfig {
    let raw = match store.get(CONFIG_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return fallback_response_config(),
        Err(err) => {
            warn!(error = %err, "failed to read response config, using default");
            return fallback_response_config();
        }
    };

    match decode_response_config(raw.as_bytes()) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "stored response config is corrupt, using default");
            fallback_response_config()
        }
    }
}

/// Overwrites the stored config. Concurrent writers race; the last one wins.
pub async fn save_response_config(
    store: &dyn RecordStore,
    config: &ResponseConfig,
) -> Result<(), ResponseConfigError> {
    let encoded = serde_json::to_string(config)?;
    store.set(CONFIG_KEY, &encoded, None).await?;
    info!(
        status_code = config.status_code,
        delay_ms = config.delay,
        headers = config.headers.len(),
        "response config updated"
    );
    Ok(())
}
