use axum::{Json, body::Bytes, extract::State};

use crate::{
    error::ApiError,
    response_config::{decode_response_config, load_response_config, save_response_config},
    state::AppState,
    types::{ResponseConfig, SetResponseConfigResponse},
};

pub async fn get_response_config_handler(State(state): State<AppState>) -> Json<ResponseConfig> {
    Json(load_response_config(state.store.as_ref()).await)
}

pub async fn set_response_config_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SetResponseConfigResponse>, ApiError> {
    let config = decode_response_config(&body)
        .map_err(|err| ApiError::validation(format!("invalid JSON: {err}")))?;

    save_response_config(state.store.as_ref(), &config).await?;

    Ok(Json(SetResponseConfigResponse {
        status: "success".to_string(),
        message: "Response configuration updated".to_string(),
        config,
    }))
}
