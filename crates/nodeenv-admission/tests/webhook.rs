//! Webhook handlers: AdmissionReview in, AdmissionReview out.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use nodeenv_admission::app_state::AppState;
use nodeenv_admission::cache::ProjectCache;
use nodeenv_admission::config;
use nodeenv_admission::ops;
use nodeenv_admission::router;
use nodeenv_admission::transport::review::{AdmissionResponse, AdmissionReview};
use nodeenv_admission::transport::webhook::{self, handle_body, handle_review, Phase};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const CONFIG: &str = r#"
version: 1
project_cache:
  default_node_selector: "region=primary"
  namespaces:
    - name: "team-a"
      annotations:
        openshift.io/node-selector: "zone=east"
    - name: "infra"
      annotations:
        scheduler.alpha.kubernetes.io/node-selector: ""
"#;

fn state() -> AppState {
    AppState::new(config::load_from_str(CONFIG).unwrap()).unwrap()
}

fn review(namespace: &str, node_selector: Value) -> AdmissionReview {
    serde_json::from_value(json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "3f1c",
            "resource": { "group": "", "version": "v1", "resource": "pods" },
            "namespace": namespace,
            "operation": "CREATE",
            "object": {
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": { "name": "web-0", "namespace": namespace },
                "spec": {
                    "containers": [{ "name": "web", "image": "nginx" }],
                    "nodeSelector": node_selector
                }
            }
        }
    }))
    .unwrap()
}

fn body(review: AdmissionReview) -> Bytes {
    Bytes::from(serde_json::to_vec(&review).unwrap())
}

fn response(review: AdmissionReview) -> AdmissionResponse {
    assert_eq!(review.kind, "AdmissionReview");
    review.response.expect("response")
}

fn decode_patch(resp: &AdmissionResponse) -> Value {
    let raw = STANDARD.decode(resp.patch.as_ref().expect("patch")).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

#[tokio::test]
async fn admit_endpoint_patches_node_selector() {
    let state = state();
    let Json(out) = webhook::admit(State(state.clone()), body(review("team-a", json!({})))).await;
    let resp = response(out);

    assert!(resp.allowed);
    assert_eq!(resp.uid, "3f1c");
    assert_eq!(resp.patch_type.as_deref(), Some("JSONPatch"));
    assert_eq!(
        decode_patch(&resp),
        json!([{ "op": "add", "path": "/spec/nodeSelector", "value": { "zone": "east" } }])
    );
    assert_eq!(
        state
            .metrics()
            .decisions
            .get(&[("phase", "mutating"), ("outcome", "patched")]),
        1
    );
}

#[tokio::test]
async fn validate_endpoint_denies_with_forbidden_status() {
    let state = state();
    let Json(out) =
        webhook::validate(State(state.clone()), body(review("team-a", json!({ "disk": "ssd" })))).await;
    let resp = response(out);

    assert!(!resp.allowed);
    assert!(resp.patch.is_none());
    let status = resp.status.expect("status");
    assert_eq!(status.code, 403);
    assert_eq!(status.reason, "Forbidden");
    assert!(status.message.contains("does not extend"));
    assert_eq!(
        state
            .metrics()
            .decisions
            .get(&[("phase", "validating"), ("outcome", "denied")]),
        1
    );
}

#[test]
fn conflict_denied_in_mutating_phase() {
    let resp = response(handle_review(
        &state(),
        review("team-a", json!({ "zone": "west" })),
        Phase::Mutating,
    ));
    assert!(!resp.allowed);
    assert!(resp.status.unwrap().message.contains("conflicts"));
}

#[test]
fn already_compliant_pod_gets_no_patch() {
    let resp = response(handle_review(
        &state(),
        review("team-a", json!({ "zone": "east", "disk": "ssd" })),
        Phase::Mutating,
    ));
    assert!(resp.allowed);
    assert!(resp.patch.is_none());
}

#[test]
fn opted_out_namespace_is_allowed_untouched() {
    let resp = response(handle_review(
        &state(),
        review("infra", json!({ "zone": "west" })),
        Phase::Mutating,
    ));
    assert!(resp.allowed);
    assert!(resp.patch.is_none());
}

#[test]
fn unknown_namespace_is_forbidden() {
    let resp = response(handle_review(&state(), review("ghost", json!({})), Phase::Validating));
    assert!(!resp.allowed);
    assert_eq!(resp.status.unwrap().code, 403);
}

#[test]
fn unsynced_cache_fails_open() {
    let cfg = config::load_from_str(CONFIG).unwrap();
    let cache = Arc::new(ProjectCache::new(&cfg.project_cache.default_node_selector));
    let state = AppState::with_cache(cfg, cache).unwrap();
    assert!(!state.is_ready());

    let resp = response(handle_review(
        &state,
        review("team-a", json!({ "zone": "west" })),
        Phase::Validating,
    ));
    assert!(resp.allowed);
}

#[test]
fn non_pod_resources_are_allowed() {
    let review: AdmissionReview = serde_json::from_value(json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "cm-1",
            "resource": { "group": "", "version": "v1", "resource": "configmaps" },
            "namespace": "ghost",
            "operation": "CREATE",
            "object": { "kind": "ConfigMap", "metadata": { "name": "cfg" } }
        }
    }))
    .unwrap();
    let resp = response(handle_review(&state(), review, Phase::Validating));
    assert!(resp.allowed);
    assert_eq!(resp.uid, "cm-1");
}

#[test]
fn review_without_request_is_bad_request() {
    let state = state();
    let review: AdmissionReview =
        serde_json::from_value(json!({ "apiVersion": "admission.k8s.io/v1", "kind": "AdmissionReview" }))
            .unwrap();
    let resp = response(handle_review(&state, review, Phase::Mutating));
    assert!(!resp.allowed);
    assert_eq!(resp.status.unwrap().code, 400);
    assert_eq!(state.metrics().malformed_reviews.get(&[("phase", "mutating")]), 1);
}

#[tokio::test]
async fn readyz_tracks_cache_sync() {
    let cfg = config::load_from_str(CONFIG).unwrap();
    let cache = Arc::new(ProjectCache::new(""));
    let state = AppState::with_cache(cfg, Arc::clone(&cache)).unwrap();

    let resp = ops::readyz(State(state.clone())).await.into_response();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    cache.set_running(true);
    let resp = ops::readyz(State(state)).await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[test]
fn metrics_extra_reports_cache() {
    let state = state();
    let extra = state.metrics_extra();
    assert!(extra.contains(&("nodeenv_cache_namespaces", 2)));
    assert!(extra.contains(&("nodeenv_cache_running", 1)));
}

const MISSING_UID: &str = r#"{"apiVersion":"admission.k8s.io/v1","kind":"AdmissionReview","request":{"resource":{"resource":"pods"}}}"#;

#[test]
fn undecodable_body_is_bad_request_review() {
    let state = state();
    let resp = response(handle_body(&state, MISSING_UID.as_bytes(), Phase::Validating));
    assert!(!resp.allowed);
    assert_eq!(resp.uid, "");
    let status = resp.status.expect("status");
    assert_eq!(status.code, 400);
    assert_eq!(status.reason, "BadRequest");
    assert!(status.message.contains("uid"));
    assert_eq!(state.metrics().malformed_reviews.get(&[("phase", "validating")]), 1);

    let resp = response(handle_body(&state, b"not json", Phase::Mutating));
    assert_eq!(resp.status.unwrap().code, 400);
    assert_eq!(state.metrics().malformed_reviews.get(&[("phase", "mutating")]), 1);
}

#[tokio::test]
async fn router_answers_malformed_review_with_admission_review() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router::build_router(state());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST /v1/validate HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{MISSING_UID}",
        MISSING_UID.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, payload) = raw.split_once("\r\n\r\n").expect("http response");
    assert!(head.starts_with("HTTP/1.1 200"), "unexpected head: {head}");
    let review: AdmissionReview = serde_json::from_str(payload).unwrap();
    let resp = response(review);
    assert!(!resp.allowed);
    assert_eq!(resp.status.unwrap().code, 400);
}
