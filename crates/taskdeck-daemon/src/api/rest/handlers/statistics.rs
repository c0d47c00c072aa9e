//! Statistics handlers

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use crate::export::{export_task_log, XLSX_CONTENT_TYPE};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use taskdeck_engine::{aggregate, Statistics};

/// Aggregate the task log
pub async fn get_statistics(State(state): State<AppState>) -> ApiResult<Json<Statistics>> {
    let entries = state.log.snapshot().await?;
    let active = u32::from(state.orchestrator.is_running());

    Ok(Json(
        aggregate(&entries, state.recent_activity_limit).with_active_sessions(active),
    ))
}

/// Download the task log as a spreadsheet
pub async fn export_statistics(State(state): State<AppState>) -> ApiResult<Response> {
    let entries = state.log.snapshot().await?;
    let bytes = export_task_log(&entries)?;

    tracing::debug!(rows = entries.len(), "Exported task log");

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"task-logs.xlsx\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
