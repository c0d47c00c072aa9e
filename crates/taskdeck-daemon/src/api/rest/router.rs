//! API Router configuration

use super::handlers;
use super::state::AppState;
use crate::config::ServerConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    // Run responses stay open for the whole run and are exempt from the
    // request timeout.
    let stream_routes = Router::new()
        .route("/batch/run", post(handlers::run_batch))
        .route(
            "/mutual-subscription/run",
            post(handlers::run_mutual_subscription),
        );

    let control_routes = Router::new()
        // Health and status
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::daemon_status))
        // Runs
        .route("/batch/cancel", post(handlers::cancel_batch))
        .route(
            "/mutual-subscription/cancel",
            post(handlers::cancel_mutual_subscription),
        )
        .route("/tasks", get(handlers::list_tasks))
        // Statistics
        .route("/statistics", get(handlers::get_statistics))
        .route("/statistics/export", get(handlers::export_statistics))
        // Accounts
        .route(
            "/accounts",
            get(handlers::list_accounts).put(handlers::replace_accounts),
        )
        .route("/accounts/import", post(handlers::import_accounts))
        .route("/accounts/validate", post(handlers::validate_accounts))
        .route("/accounts/selection", get(handlers::account_selection))
        // Run configuration
        .route(
            "/config",
            get(handlers::get_run_config).put(handlers::update_run_config),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )));

    let mut router = Router::new()
        .nest("/api", stream_routes.merge(control_routes))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
