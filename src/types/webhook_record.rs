use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
    #[serde(default)]
    pub body_encoding: BodyEncoding,
    pub method: String,
    pub url: String,
}

/// How `WebhookRecord::body` maps back to the bytes that were received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    #[default]
    Utf8,
    Base64,
}
