//! Account roster handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::roster_import::read_roster_bytes;
use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdeck_engine::{select_accounts, ExecutorError};
use taskdeck_types::Account;

/// List the roster
pub async fn list_accounts(State(state): State<AppState>) -> Json<Vec<Account>> {
    Json(state.roster.list().await)
}

/// Replace the roster from JSON
pub async fn replace_accounts(
    State(state): State<AppState>,
    Json(accounts): Json<Vec<Account>>,
) -> Json<Vec<Account>> {
    let kept = state.roster.replace(accounts).await;
    tracing::info!(accounts = kept, "Roster replaced");
    Json(state.roster.list().await)
}

/// Replace the roster from an uploaded `.xlsx` body
pub async fn import_accounts(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Vec<Account>>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    }

    let accounts = read_roster_bytes(&body)?;
    let kept = state.roster.replace(accounts).await;
    tracing::info!(accounts = kept, bytes = body.len(), "Roster imported");

    Ok(Json(state.roster.list().await))
}

/// Check every roster account and record the reported statuses
pub async fn validate_accounts(State(state): State<AppState>) -> ApiResult<Json<Vec<Account>>> {
    let accounts = state.roster.list().await;
    let mut checks = Vec::with_capacity(accounts.len());

    for account in &accounts {
        match state.validator.validate(account).await {
            Ok(check) => checks.push((account.auth_token.clone(), check)),
            Err(ExecutorError::Task(reason)) => {
                tracing::warn!(account = %account.label(), %reason, "Account validation failed");
            }
            Err(e @ ExecutorError::Fatal(_)) => {
                tracing::error!(error = %e, "Account validation aborted");
                return Err(ApiError::Internal(e.to_string()));
            }
        }
    }

    let validated = checks.len();
    let updated = state.roster.update_statuses(checks).await;
    tracing::info!(accounts = accounts.len(), validated, "Roster validated");

    Ok(Json(updated))
}

/// Account sequence a caller would submit under the current run configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountSelectionResponse {
    pub account_tokens: Vec<String>,
    pub total: usize,
}

/// Apply range, exact-index and shuffle settings to the roster
pub async fn account_selection(State(state): State<AppState>) -> Json<AccountSelectionResponse> {
    let roster = state.roster.list().await;
    let config = state.run_config.get().await;

    let selected = {
        let mut rng = rand::thread_rng();
        select_accounts(&roster, &config.settings, &mut rng)
    };

    let account_tokens: Vec<String> = selected.into_iter().map(|a| a.auth_token).collect();
    Json(AccountSelectionResponse {
        total: account_tokens.len(),
        account_tokens,
    })
}
