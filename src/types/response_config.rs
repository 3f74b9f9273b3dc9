use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfig {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// Empty means the built-in acknowledgement body is sent.
    pub body: String,
    /// Milliseconds to wait before answering.
    pub delay: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct SetResponseConfigResponse {
    pub status: String,
    pub message: String,
    pub config: ResponseConfig,
}
