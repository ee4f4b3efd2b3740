//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs sizes and basic result info.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::logic::generate_test;
use crate::protocol::*;
use crate::state::AppState;
use crate::theme::Theme;
use crate::util::fill_template;

/// Bodies are parsed regardless of `Content-Type`; unreadable JSON is a 400 `{error}`.
fn parse_json_body<T: DeserializeOwned>(state: &AppState, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| {
        ApiError::BadRequest(fill_template(&state.messages.invalid_params_template, &[("cause", &e.to_string())]))
    })
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_post_generate_test(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GenerateTestOut>, ApiError> {
    let body: GenerateTestIn = parse_json_body(&state, &body)?;
    let out = generate_test(&state, body).await?;
    Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_form(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.new_form().layout().await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_theme(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ThemeOut {
        theme: state.theme.current().await,
        storage_key: state.theme.storage_key().to_string(),
    })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_put_theme(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ThemeOut>, ApiError> {
    let body: ThemeIn = parse_json_body(&state, &body)?;
    let theme = body.theme.parse::<Theme>().map_err(|_| {
        ApiError::BadRequest(fill_template(&state.messages.invalid_theme_template, &[("theme", &body.theme)]))
    })?;
    state
        .theme
        .set(theme)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    info!(target: "quizgen_backend", %theme, "Theme preference stored");
    Ok(Json(ThemeOut {
        theme,
        storage_key: state.theme.storage_key().to_string(),
    }))
}
