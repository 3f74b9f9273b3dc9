use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicI64, Ordering},
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{
    store::{RecordStore, StoreError},
    types::{BodyEncoding, WebhookRecord},
    webhooks::RetentionConfig,
};

pub const RECORD_KEY_PREFIX: &str = "webhook:";
pub const INDEX_KEY: &str = "webhooks:list";

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode webhook record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Issues `webhook:<ns>` keys that strictly increase within the process,
/// even when the clock repeats or steps backwards.
#[derive(Debug, Default)]
pub struct WebhookIdGenerator {
    last: AtomicI64,
}

impl WebhookIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> (String, DateTime<Utc>) {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let prev = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(now.max(prev.saturating_add(1)))
            }) {
            Ok(prev) | Err(prev) => prev,
        };
        let nanos = now.max(prev.saturating_add(1));
        (
            format!("{RECORD_KEY_PREFIX}{nanos}"),
            DateTime::from_timestamp_nanos(nanos),
        )
    }
}

#[derive(Debug, Clone)]
pub struct IncomingWebhook {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Vec<u8>,
}

pub async fn ingest_webhook(
    store: &dyn RecordStore,
    retention: &RetentionConfig,
    ids: &WebhookIdGenerator,
    incoming: IncomingWebhook,
) -> Result<WebhookRecord, WebhookError> {
    let (id, timestamp) = ids.next();
    let (body, body_encoding) = encode_body(incoming.body);

    let record = WebhookRecord {
        id,
        timestamp,
        headers: incoming.headers,
        body,
        body_encoding,
        method: incoming.method,
        url: incoming.url,
    };

    let encoded = serde_json::to_string(&record)?;
    store
        .set(&record.id, &encoded, Some(retention.record_ttl))
        .await?;

    // The record is already durable; a missed index entry only hides it from listings.
    if let Err(err) = store
        .push_bounded(INDEX_KEY, &record.id, retention.index_cap)
        .await
    {
        warn!(key = %record.id, error = %err, "failed to add webhook to index");
    }

    info!(key = %record.id, bytes = encoded.len(), "webhook received and saved");
    Ok(record)
}

fn encode_body(body: Vec<u8>) -> (String, BodyEncoding) {
    match String::from_utf8(body) {
        Ok(text) => (text, BodyEncoding::Utf8),
        Err(err) => (STANDARD.encode(err.into_bytes()), BodyEncoding::Base64),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    TimestampAsc,
    #[default]
    TimestampDesc,
    Method,
    Url,
}

impl SortOrder {
    /// Unknown or missing values fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("timestamp-asc") => Self::TimestampAsc,
            Some("method") => Self::Method,
            Some("url") => Self::Url,
            _ => Self::TimestampDesc,
        }
    }

    fn apply(self, records: &mut [WebhookRecord]) {
        match self {
            Self::TimestampAsc => records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            Self::TimestampDesc => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            Self::Method => records.sort_by(|a, b| a.method.cmp(&b.method)),
            Self::Url => records.sort_by(|a, b| a.url.cmp(&b.url)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListWebhooksParams {
    pub limit: usize,
    pub search: Option<String>,
    pub sort: SortOrder,
}

#[derive(Debug, Clone)]
pub struct ListWebhooksResult {
    pub webhooks: Vec<WebhookRecord>,
    /// Identifiers read from the index before hydration and filtering.
    pub total: usize,
}

pub async fn list_webhooks(
    store: &dyn RecordStore,
    params: &ListWebhooksParams,
) -> Result<ListWebhooksResult, WebhookError> {
    // Over-fetch so filtered-out and expired entries don't starve the page.
    let keys = store
        .list_range(INDEX_KEY, Some(params.limit.saturating_mul(2)))
        .await?;

    let needle = params
        .search
        .as_deref()
        .map(str::to_lowercase)
        .filter(|needle| !needle.is_empty());

    let mut webhooks = Vec::with_capacity(params.limit.min(keys.len()));
    for key in &keys {
        let record = match load_record(store, key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(key = %key, "indexed webhook has expired");
                continue;
            }
            Err(err) => {
                warn!(key = %key, error = %err, "skipping unreadable webhook");
                continue;
            }
        };

        if let Some(needle) = needle.as_deref()
            && !matches_search(&record, needle)
        {
            continue;
        }

        webhooks.push(record);
        if webhooks.len() >= params.limit {
            break;
        }
    }

    params.sort.apply(&mut webhooks);

    Ok(ListWebhooksResult {
        webhooks,
        total: keys.len(),
    })
}

async fn load_record(
    store: &dyn RecordStore,
    key: &str,
) -> Result<Option<WebhookRecord>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StoreError::Corrupt {
            key: key.to_string(),
            reason: err.to_string(),
        })
}

/// `needle` must already be lowercase.
fn matches_search(record: &WebhookRecord, needle: &str) -> bool {
    let body = match record.body_encoding {
        BodyEncoding::Utf8 => record.body.to_lowercase(),
        BodyEncoding::Base64 => STANDARD
            .decode(&record.body)
            .map(|bytes| String::from_utf8_lossy(&bytes).to_lowercase())
            .unwrap_or_default(),
    };

    body.contains(needle)
        || render_headers(&record.headers).to_lowercase().contains(needle)
        || record.url.to_lowercase().contains(needle)
        || record.method.to_lowercase().contains(needle)
}

fn render_headers(headers: &BTreeMap<String, Vec<String>>) -> String {
    headers
        .iter()
        .map(|(name, values)| format!("{name}: {}", values.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deletes every indexed record, then the index itself. Returns how many
/// identifiers the index held.
pub async fn clear_webhooks(store: &dyn RecordStore) -> Result<usize, WebhookError> {
    let keys = store.list_range(INDEX_KEY, None).await?;

    // Leave the index in place on failure so the purge can be retried.
    if !keys.is_empty() {
        store.delete(&keys).await?;
    }
    store.delete(&[INDEX_KEY.to_string()]).await?;

    info!(count = keys.len(), "cleared webhooks");
    Ok(keys.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::{collections::HashSet, time::Duration};

    use chrono::TimeZone;

    use super::*;
    use crate::store::MemoryStore;

    fn record(method: &str, url: &str, body: &str, secs: i64) -> WebhookRecord {
        WebhookRecord {
            id: format!("webhook:{secs}"),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            headers: BTreeMap::from([(
                "content-type".to_string(),
                vec!["application/json".to_string()],
            )]),
            body: body.to_string(),
            body_encoding: BodyEncoding::Utf8,
            method: method.to_string(),
            url: url.to_string(),
        }
    }

    fn incoming(body: &[u8]) -> IncomingWebhook {
        IncomingWebhook {
            method: "POST".to_string(),
            url: "/webhook".to_string(),
            headers: BTreeMap::new(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let ids = WebhookIdGenerator::new();
        let mut seen = HashSet::new();
        let mut last = 0_i64;
        for _ in 0..10_000 {
            let (id, timestamp) = ids.next();
            let nanos: i64 = id.strip_prefix(RECORD_KEY_PREFIX).unwrap().parse().unwrap();
            assert!(nanos > last);
            assert_eq!(timestamp.timestamp_nanos_opt(), Some(nanos));
            assert!(seen.insert(id));
            last = nanos;
        }
    }

    #[test]
    fn non_utf8_bodies_are_kept_as_base64() {
        let (body, encoding) = encode_body(vec![0xff, 0x00, 0x41]);
        assert_eq!(encoding, BodyEncoding::Base64);
        assert_eq!(STANDARD.decode(body).unwrap(), vec![0xff, 0x00, 0x41]);

        let (body, encoding) = encode_body(b"{\"a\":1}".to_vec());
        assert_eq!(encoding, BodyEncoding::Utf8);
        assert_eq!(body, "{\"a\":1}");
    }

    #[test]
    fn sort_order_parses_known_values() {
        assert_eq!(SortOrder::parse(None), SortOrder::TimestampDesc);
        assert_eq!(SortOrder::parse(Some("timestamp-asc")), SortOrder::TimestampAsc);
        assert_eq!(SortOrder::parse(Some("timestamp-desc")), SortOrder::TimestampDesc);
        assert_eq!(SortOrder::parse(Some("method")), SortOrder::Method);
        assert_eq!(SortOrder::parse(Some("url")), SortOrder::Url);
        assert_eq!(SortOrder::parse(Some("size")), SortOrder::TimestampDesc);
    }

    #[test]
    fn sorting_by_each_key() {
        let mut records = vec![
            record("PUT", "/b", "", 2),
            record("DELETE", "/c", "", 3),
            record("POST", "/a", "", 1),
        ];

        SortOrder::TimestampAsc.apply(&mut records);
        assert_eq!(records.iter().map(|r| r.timestamp.timestamp()).collect::<Vec<_>>(), [1, 2, 3]);

        SortOrder::TimestampDesc.apply(&mut records);
        assert_eq!(records.iter().map(|r| r.timestamp.timestamp()).collect::<Vec<_>>(), [3, 2, 1]);

        SortOrder::Method.apply(&mut records);
        assert_eq!(records.iter().map(|r| r.method.as_str()).collect::<Vec<_>>(), ["DELETE", "POST", "PUT"]);

        SortOrder::Url.apply(&mut records);
        assert_eq!(records.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(), ["/a", "/b", "/c"]);
    }

    #[test]
    fn search_covers_body_headers_url_and_method() {
        let r = record("POST", "/Hooks/Stripe", "{\"event\":\"Charge.Succeeded\"}", 1);
        assert!(matches_search(&r, "charge.succeeded"));
        assert!(matches_search(&r, "application/json"));
        assert!(matches_search(&r, "content-type"));
        assert!(matches_search(&r, "stripe"));
        assert!(matches_search(&r, "post"));
        assert!(!matches_search(&r, "github"));
    }

    #[tokio::test]
    async fn ingest_persists_record_and_indexes_it() {
        let store = MemoryStore::new();
        let retention = RetentionConfig::default();
        let ids = WebhookIdGenerator::new();

        let record = ingest_webhook(&store, &retention, &ids, incoming(b"payload"))
            .await
            .unwrap();

        let raw = store.get(&record.id).await.unwrap().expect("record stored");
        let stored: WebhookRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, record);
        assert_eq!(store.list_range(INDEX_KEY, None).await.unwrap(), vec![record.id]);
    }

    #[tokio::test]
    async fn ingest_fails_without_touching_index_when_store_is_down() {
        let store = MemoryStore::new();
        store.set_unreachable(true);

        let result = ingest_webhook(
            &store,
            &RetentionConfig::default(),
            &WebhookIdGenerator::new(),
            incoming(b"payload"),
        )
        .await;
        assert!(matches!(result, Err(WebhookError::Store(StoreError::Unavailable(_)))));

        store.set_unreachable(false);
        assert!(store.list_range(INDEX_KEY, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn index_is_capped_to_newest_entries() {
        let store = MemoryStore::new();
        let retention = RetentionConfig {
            record_ttl: Duration::from_secs(60),
            index_cap: 5,
        };
        let ids = WebhookIdGenerator::new();

        let mut all = Vec::new();
        for i in 0..8 {
            let record = ingest_webhook(&store, &retention, &ids, incoming(format!("{i}").as_bytes()))
                .await
                .unwrap();
            all.push(record.id);
        }

        let index = store.list_range(INDEX_KEY, None).await.unwrap();
        let expected: Vec<String> = all.iter().rev().take(5).cloned().collect();
        assert_eq!(index, expected);
    }

    #[tokio::test]
    async fn list_skips_expired_and_corrupt_entries() {
        let store = MemoryStore::new();
        let retention = RetentionConfig::default();
        let ids = WebhookIdGenerator::new();

        let kept = ingest_webhook(&store, &retention, &ids, incoming(b"kept"))
            .await
            .unwrap();
        let expired = ingest_webhook(&store, &retention, &ids, incoming(b"expired"))
            .await
            .unwrap();
        let corrupt = ingest_webhook(&store, &retention, &ids, incoming(b"corrupt"))
            .await
            .unwrap();

        store.delete(&[expired.id.clone()]).await.unwrap();
        store.set(&corrupt.id, "{not json", None).await.unwrap();

        let result = list_webhooks(
            &store,
            &ListWebhooksParams {
                limit: 10,
                search: None,
                sort: SortOrder::TimestampDesc,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.webhooks, vec![kept]);
    }

    #[tokio::test]
    async fn list_reads_twice_the_limit_and_stops_at_limit() {
        let store = MemoryStore::new();
        let retention = RetentionConfig::default();
        let ids = WebhookIdGenerator::new();
        for i in 0..10 {
            ingest_webhook(&store, &retention, &ids, incoming(format!("{i}").as_bytes()))
                .await
                .unwrap();
        }

        let result = list_webhooks(
            &store,
            &ListWebhooksParams {
                limit: 3,
                search: None,
                sort: SortOrder::TimestampDesc,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.total, 6);
        assert_eq!(
            result.webhooks.iter().map(|r| r.body.as_str()).collect::<Vec<_>>(),
            ["9", "8", "7"]
        );
    }

    #[tokio::test]
    async fn clear_removes_records_and_index() {
        let store = MemoryStore::new();
        let retention = RetentionConfig::default();
        let ids = WebhookIdGenerator::new();
        let record = ingest_webhook(&store, &retention, &ids, incoming(b"x"))
            .await
            .unwrap();

        assert_eq!(clear_webhooks(&store).await.unwrap(), 1);
        assert_eq!(store.get(&record.id).await.unwrap(), None);
        assert!(store.list_range(INDEX_KEY, None).await.unwrap().is_empty());

        assert_eq!(clear_webhooks(&store).await.unwrap(), 0);
    }
}
