use std::time::Instant;

use axum::{body::Bytes, extract::State, Json};

use nodeenv_core::error::NodeEnvError;
use nodeenv_core::StatusReason;

use super::review::{AdmissionResponse, AdmissionReview, API_VERSION};
use crate::app_state::AppState;

/// Pipeline phase served by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Mutating,
    Validating,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Mutating => "mutating",
            Phase::Validating => "validating",
        }
    }
}

/// `POST /v1/admit`
pub async fn admit(State(state): State<AppState>, body: Bytes) -> Json<AdmissionReview> {
    Json(handle_body(&state, &body, Phase::Mutating))
}

/// `POST /v1/validate`
pub async fn validate(State(state): State<AppState>, body: Bytes) -> Json<AdmissionReview> {
    Json(handle_body(&state, &body, Phase::Validating))
}

/// Decode a raw request body and run it. Undecodable bodies still get an
/// `AdmissionReview` back, denied as a bad request.
pub fn handle_body(state: &AppState, body: &[u8], phase: Phase) -> AdmissionReview {
    match serde_json::from_slice::<AdmissionReview>(body) {
        Ok(review) => handle_review(state, review, phase),
        Err(e) => {
            state
                .metrics()
                .malformed_reviews
                .inc(&[("phase", phase.as_str())]);
            tracing::warn!(phase = phase.as_str(), error = %e, "undecodable admission review");
            let err = NodeEnvError::BadRequest(format!("invalid AdmissionReview: {e}"));
            AdmissionReview::respond(API_VERSION, AdmissionResponse::deny("", &err))
        }
    }
}

/// Run one review through the chain for `phase`.
pub fn handle_review(state: &AppState, review: AdmissionReview, phase: Phase) -> AdmissionReview {
    let api_version = review.api_version.clone();
    let Some(request) = review.request else {
        state
            .metrics()
            .malformed_reviews
            .inc(&[("phase", phase.as_str())]);
        let err = NodeEnvError::BadRequest("AdmissionReview has no request".into());
        return AdmissionReview::respond(&api_version, AdmissionResponse::deny("", &err));
    };

    let started = Instant::now();
    let uid = request.uid.as_str();

    let mut attrs = match request.to_attributes() {
        Ok(attrs) => attrs,
        Err(e) => {
            state
                .metrics()
                .malformed_reviews
                .inc(&[("phase", phase.as_str())]);
            tracing::warn!(%uid, error = %e, "malformed admission request");
            return AdmissionReview::respond(&api_version, AdmissionResponse::deny(uid, &e));
        }
    };

    let before = attrs.pod().map(|p| p.spec.node_selector.clone());
    let result = match phase {
        Phase::Mutating => state.chain().admit(&mut attrs),
        Phase::Validating => state.chain().validate(&attrs),
    };

    let (response, outcome) = match result {
        Err(e) => {
            let outcome = match e.status_reason() {
                StatusReason::Forbidden => "denied",
                _ => "error",
            };
            (AdmissionResponse::deny(uid, &e), outcome)
        }
        Ok(()) => {
            let after = attrs.pod().map(|p| &p.spec.node_selector);
            match (before.as_ref(), after) {
                (Some(b), Some(a)) if phase == Phase::Mutating && b != a => {
                    match AdmissionResponse::patched(uid, a) {
                        Ok(resp) => (resp, "patched"),
                        Err(e) => (AdmissionResponse::deny(uid, &e), "error"),
                    }
                }
                _ => (AdmissionResponse::allow(uid), "allowed"),
            }
        }
    };

    let m = state.metrics();
    m.decisions
        .inc(&[("phase", phase.as_str()), ("outcome", outcome)]);
    m.decision_duration
        .observe(&[("phase", phase.as_str())], started.elapsed());
    tracing::debug!(
        %uid,
        phase = phase.as_str(),
        operation = attrs.operation().as_str(),
        resource = %attrs.resource(),
        namespace = %attrs.namespace(),
        outcome,
        "admission review handled"
    );

    AdmissionReview::respond(&api_version, response)
}
