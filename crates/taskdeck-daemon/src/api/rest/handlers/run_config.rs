//! Run configuration handlers

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{extract::State, Json};
use taskdeck_types::RunConfiguration;

/// Get the live run configuration
pub async fn get_run_config(State(state): State<AppState>) -> Json<RunConfiguration> {
    Json(state.run_config.get().await)
}

/// Validate, persist and apply a run configuration
pub async fn update_run_config(
    State(state): State<AppState>,
    Json(config): Json<RunConfiguration>,
) -> ApiResult<Json<RunConfiguration>> {
    Ok(Json(state.run_config.update(config).await?))
}
