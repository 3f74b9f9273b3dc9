use std::{net::SocketAddr, sync::Arc};

use tracing::{error, info};
use webhook_receiver::{
    AppState, start_server,
    store::{RecordStore, RedisSettings, RedisStore},
    webhooks::RetentionConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let redis = RedisSettings::from_env();
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(8080);
    let admin_api_token = std::env::var("ADMIN_API_TOKEN").ok();
    let retention = RetentionConfig::from_env();

    let store = match connect(&redis).await {
        Ok(store) => store,
        Err(err) => {
            error!(addr = %redis.addr(), error = %err, "failed to connect to redis");
            return Err(err.into());
        }
    };
    info!(addr = %redis.addr(), db = redis.db, "connected to redis");

    let state = AppState::new(Arc::new(store), retention).with_admin_api_token(admin_api_token);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    start_server(state, addr).await?;

    Ok(())
}

async fn connect(settings: &RedisSettings) -> Result<RedisStore, webhook_receiver::store::StoreError> {
    let store = RedisStore::connect(settings).await?;
    store.ping().await?;
    Ok(store)
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,tower_http=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
