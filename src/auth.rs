use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{error::ApiError, state::AppState};

/// Guards the admin write routes when `ADMIN_API_TOKEN` is configured.
pub async fn admin_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected_token) = &state.admin_api_token else {
        return Ok(next.run(req).await);
    };

    let provided_token = match req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    {
        Some(token) => token,
        None => {
            return Err(ApiError::unauthorized(
                "missing or invalid Authorization header",
            ));
        }
    };

    if !constant_time_eq(expected_token.as_bytes(), provided_token.as_bytes()) {
        return Err(ApiError::unauthorized("invalid token"));
    }

    Ok(next.run(req).await)
}

fn bearer_token(value: &str) -> Option<&str> {
    let trimmed = value.trim_start();
    let (scheme, token) = trimmed.split_at_checked(7)?;
    scheme
        .eq_ignore_ascii_case("bearer ")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
