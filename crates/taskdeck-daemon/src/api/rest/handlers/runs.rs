//! Batch and mutual subscription run handlers

use crate::api::rest::state::AppState;
use crate::api::rest::stream::ndjson_response;
use crate::error::ApiResult;
use axum::{extract::State, response::Response, Json};
use serde::{Deserialize, Serialize};
use taskdeck_types::{BatchRequest, MutualSubscriptionRequest};

/// Cancel response
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    pub success: bool,
    pub run_active: bool,
}

/// Start a batch run and stream its progress
pub async fn run_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> ApiResult<Response> {
    let handle = state.orchestrator.start_batch(request).await?;
    tracing::debug!(run_id = %handle.run_id(), total = handle.total(), "Streaming batch progress");
    Ok(ndjson_response(handle.into_progress()))
}

/// Request cancellation of the active batch run
pub async fn cancel_batch(State(state): State<AppState>) -> Json<CancelResponse> {
    cancel(&state)
}

/// Start a mutual subscription run and stream its progress
pub async fn run_mutual_subscription(
    State(state): State<AppState>,
    Json(request): Json<MutualSubscriptionRequest>,
) -> ApiResult<Response> {
    let handle = state.orchestrator.start_mutual_subscription(request).await?;
    tracing::debug!(
        run_id = %handle.run_id(),
        total = handle.total(),
        "Streaming mutual subscription progress"
    );
    Ok(ndjson_response(handle.into_progress()))
}

/// Request cancellation of the active mutual subscription run
pub async fn cancel_mutual_subscription(State(state): State<AppState>) -> Json<CancelResponse> {
    cancel(&state)
}

// Both run kinds share the single-flight slot, so either endpoint cancels
// whichever run is active.
fn cancel(state: &AppState) -> Json<CancelResponse> {
    state.orchestrator.cancel();
    Json(CancelResponse {
        success: true,
        run_active: state.orchestrator.is_running(),
    })
}
