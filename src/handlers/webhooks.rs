use std::{collections::BTreeMap, time::Duration};

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{OriginalUri, State},
    http::{
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
        header::CONTENT_TYPE,
    },
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::ApiError,
    extractors::ValidQuery,
    response_config::load_response_config,
    state::AppState,
    types::{ClearWebhooksResponse, IngestAck, ListWebhooksResponse, ResponseConfig},
    webhooks::{
        DEFAULT_LIST_LIMIT, IncomingWebhook, ListWebhooksParams, MAX_LIST_LIMIT, SortOrder,
        clear_webhooks, ingest_webhook, list_webhooks,
    },
};

pub async fn ingest_webhook_handler(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let incoming = IncomingWebhook {
        method: method.to_string(),
        url: uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string()),
        headers: collect_headers(&headers),
        body: body.to_vec(),
    };

    let record = ingest_webhook(
        state.store.as_ref(),
        &state.retention,
        &state.ids,
        incoming,
    )
    .await?;

    let config = load_response_config(state.store.as_ref()).await;
    if config.delay > 0 {
        debug!(key = %record.id, delay_ms = config.delay, "delaying webhook response");
        tokio::time::sleep(Duration::from_millis(config.delay)).await;
    }

    synthesize_response(&config, &record.id)
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        collected
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}

fn synthesize_response(config: &ResponseConfig, key: &str) -> Result<Response, ApiError> {
    let body = if config.body.is_empty() {
        serde_json::to_string(&IngestAck {
            status: "success".to_string(),
            message: "Webhook received and saved".to_string(),
            key: key.to_string(),
        })?
    } else {
        config.body.clone()
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = final_status(config.status_code);

    let response_headers = response.headers_mut();
    for (name, value) in &config.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response_headers.insert(name, value);
            }
            _ => warn!(header = %name, "skipping invalid configured response header"),
        }
    }
    if !response_headers.contains_key(CONTENT_TYPE) {
        response_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(response)
}

/// Informational codes cannot end a response; they are answered with 200.
fn final_status(code: u16) -> StatusCode {
    match StatusCode::from_u16(code) {
        Ok(status) if status.is_informational() => {
            warn!(status_code = code, "informational status configured, responding with 200");
            StatusCode::OK
        }
        Ok(status) => status,
        Err(_) => StatusCode::OK,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListWebhooksQuery {
    limit: Option<String>,
    search: Option<String>,
    sort: Option<String>,
}

pub async fn list_webhooks_handler(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListWebhooksQuery>,
) -> Result<Json<ListWebhooksResponse>, ApiError> {
    let params = ListWebhooksParams {
        limit: parse_limit(query.limit.as_deref()),
        search: query.search,
        sort: SortOrder::parse(query.sort.as_deref()),
    };

    let result = list_webhooks(state.store.as_ref(), &params).await?;

    Ok(Json(ListWebhooksResponse {
        count: result.webhooks.len(),
        webhooks: result.webhooks,
        total: result.total,
    }))
}

/// Unparseable or non-positive limits use the default; large ones are capped.
fn parse_limit(raw: Option<&str>) -> usize {
    match raw.map(str::trim).and_then(|value| value.parse::<i64>().ok()) {
        Some(limit) if limit > 0 => usize::try_from(limit)
            .unwrap_or(MAX_LIST_LIMIT)
            .min(MAX_LIST_LIMIT),
        _ => DEFAULT_LIST_LIMIT,
    }
}

pub async fn clear_webhooks_handler(
    State(state): State<AppState>,
) -> Result<Json<ClearWebhooksResponse>, ApiError> {
    let count = clear_webhooks(state.store.as_ref()).await?;

    Ok(Json(ClearWebhooksResponse {
        status: "success".to_string(),
        message: format!("Cleared {count} webhooks"),
        count,
    }))
}
