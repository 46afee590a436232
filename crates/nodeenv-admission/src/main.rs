//! nodeenv admission webhook.
//!
//! Serves the pod node environment plugin over HTTP:
//! - `/v1/admit`    : mutating phase (merges the project node selector)
//! - `/v1/validate` : validating phase (re-checks without mutating)
//!
//! Usage: `nodeenv-admission [config-path]` (default `nodeenv.yaml`).

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use nodeenv_admission::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "nodeenv.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.server.listen.parse()?;

    let state = app_state::AppState::new(cfg)?;
    tracing::info!(plugins = ?state.chain().names(), "admission chain ready");
    let app = router::build_router(state);

    tracing::info!(%listen, "nodeenv-admission starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
