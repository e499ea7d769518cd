use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// POST /alert — decode an Alertmanager webhook batch, run the mapped
/// remediation for each alert, and report every outcome in one response.
///
/// The response is 200 even when individual remediations fail; the HTTP
/// status only says whether the payload itself was processable. Only a
/// structurally malformed payload is a request-level error (400).
pub async fn post_alert(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let request_id = Uuid::new_v4();
    info!(%request_id, bytes = body.len(), "received alert payload");

    let batch = autoheal_core::parser::parse(&body)?;
    for skip in &batch.skipped {
        warn!(%request_id, "skipping entry: {skip}");
    }

    let result = app.dispatcher.run(&batch.events).await;

    let classifications: Vec<_> = result
        .outcomes
        .iter()
        .map(|o| o.classification)
        .collect();
    info!(
        %request_id,
        events = batch.events.len(),
        skipped = batch.skipped.len(),
        ?classifications,
        overall = ?result.overall_status,
        "batch processed"
    );

    Ok(Json(serde_json::json!({
        "status": "success",
        "overall_status": result.overall_status,
        "outcomes": result.outcomes,
    })))
}
