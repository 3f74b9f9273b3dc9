#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, header::CONTENT_TYPE},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use webhook_receiver::{AppState, create_router, store::MemoryStore, webhooks::RetentionConfig};

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_state(|state| state)
    }

    pub fn with_state(configure: impl FnOnce(AppState) -> AppState) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = configure(AppState::new(store.clone(), RetentionConfig::default()));
        Self {
            store,
            router: create_router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, body: impl Into<Body>) -> Response {
        self.send(Request::post(uri).body(body.into()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn list(&self, query: &str) -> Value {
        let response = self.get(&format!("/api/webhooks{query}")).await;
        assert!(response.status().is_success());
        json_body(response).await
    }
}

pub async fn response_body(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn json_body(response: Response) -> Value {
    serde_json::from_str(&response_body(response).await).expect("response body is JSON")
}
