//! Task catalog handler

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use taskdeck_types::TaskSpec;

/// List the task catalog
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<TaskSpec>> {
    Json(state.orchestrator.catalog().specs().to_vec())
}
