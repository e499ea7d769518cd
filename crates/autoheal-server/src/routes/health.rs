use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /healthz — liveness probe with the loaded action count.
pub async fn healthz(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "actions": app.dispatcher.registry().len(),
    }))
}
