use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::models::lead_models::{CallPayload, LeadSubmission};
use crate::AppState;

/// Standalone call trigger. The submission pipeline goes through
/// `spawn_call` instead; this endpoint exists for direct integrations and
/// reports the dispatch failure it would otherwise only log.
pub async fn trigger_call(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CallPayload>,
) -> (StatusCode, Json<Value>) {
    if payload.name.trim().is_empty() || payload.phone.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Name and phone number are required"
            })),
        );
    }

    let lead = LeadSubmission {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: payload.phone.trim().to_string(),
        message: payload.message.trim().to_string(),
    };

    match state.call_trigger.trigger_call(&lead).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "callId": outcome.call_id,
                "message": outcome.message
            })),
        ),
        Err(e) => {
            error!("call trigger failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Failed to initiate call"
                })),
            )
        }
    }
}
