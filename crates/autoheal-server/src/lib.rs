pub mod error;
pub mod routes;
pub mod state;

use autoheal_core::config::{Config, WarnLevel};
use autoheal_core::dispatch::Dispatcher;
use autoheal_core::executor::ProcessExecutor;
use autoheal_core::registry::ActionRegistry;
use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application state from a loaded config. Validates the action
/// table exactly once: warning-level findings are logged, any error-level
/// finding fails fast so a broken mapping never starts serving.
pub fn build_state(cfg: &Config) -> anyhow::Result<AppState> {
    let findings = cfg.validate();
    for w in findings.iter().filter(|w| w.level == WarnLevel::Warning) {
        tracing::warn!("{}", w.message);
    }
    let registry = ActionRegistry::from_validated(cfg, &findings)?;
    let executor = ProcessExecutor::new(cfg.capture.max_output_bytes);
    Ok(AppState::new(Arc::new(Dispatcher::new(registry, executor))))
}

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/alert", post(routes::alert::post_alert))
        .route("/healthz", get(routes::health::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the webhook server. `bind_override` takes precedence over the
/// configured bind address (used by `autoheal serve --bind`).
pub async fn serve(cfg: Config, bind_override: Option<String>) -> anyhow::Result<()> {
    let bind = bind_override.unwrap_or_else(|| cfg.server.bind.clone());
    let state = build_state(&cfg)?;
    tracing::info!(
        actions = state.dispatcher.registry().len(),
        "action registry loaded"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("autoheal webhook listening on http://{bind}");

    axum::serve(listener, app).await?;
    Ok(())
}
