//! Router assembly and server lifecycle.
//!
//! Every request passes through request-id injection and a `TraceLayer`
//! span. The two admin write routes additionally sit behind
//! [`admin_auth`], which is a no-op unless a token is configured.

use std::net::SocketAddr;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::admin_auth,
    handlers::{
        dashboard::dashboard_handler,
        health::health_handler,
        method_not_allowed,
        response_config::{get_response_config_handler, set_response_config_handler},
        webhooks::{clear_webhooks_handler, ingest_webhook_handler, list_webhooks_handler},
    },
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/api/webhooks/clear",
            post(clear_webhooks_handler).fallback(method_not_allowed),
        )
        .route(
            "/api/response-config/set",
            post(set_response_config_handler).fallback(method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        .route(
            "/webhook",
            post(ingest_webhook_handler).fallback(method_not_allowed),
        )
        .route("/health", get(health_handler))
        .route("/webhooks", get(list_webhooks_handler))
        .route("/api/webhooks", get(list_webhooks_handler))
        .route(
            "/api/response-config",
            get(get_response_config_handler).fallback(method_not_allowed),
        )
        .route("/", get(dashboard_handler))
        .route("/dashboard", get(dashboard_handler))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Tags every response with an `X-Request-Id` header.
async fn inject_request_id(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;
    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    info!(addr = %local_addr, "webhook receiver listening");
    info!("dashboard:        http://{local_addr}/");
    info!("webhook endpoint: http://{local_addr}/webhook");
    info!("health check:     http://{local_addr}/health");
    info!("api:              http://{local_addr}/api/webhooks");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }

    warn!("waiting for in-flight requests to finish");
}
