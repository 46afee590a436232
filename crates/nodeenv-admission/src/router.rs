//! Axum router wiring.
//!
//! Webhook endpoints for both admission phases plus the ops endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport::webhook};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/admit", post(webhook::admit))
        .route("/v1/validate", post(webhook::validate))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
