//! REST endpoint that accepts submitted applications.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use super::model::SOURCE_TAG;
use crate::store::{Database, NewLead};

/// Fields that must be present and truthy, checked in this order.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "email", "goal", "daysPerWeek", "experience"];

/// Shared state for the apply routes.
#[derive(Clone)]
pub struct ApplyState {
    pub db: Arc<dyn Database>,
}

/// Build the apply REST routes.
///
/// `allowed_origin` pins CORS to one origin; `None` allows any.
pub fn apply_routes(state: ApplyState, allowed_origin: Option<HeaderValue>) -> Router {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/apply", post(submit_application))
        .with_state(state)
        .layer(cors)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "coach-apply"
    }))
}

/// POST /api/apply
///
/// Presence-checks the required fields, then appends the payload as a lead.
/// Every path answers with JSON; causes of unexpected failures stay in the
/// logs.
async fn submit_application(
    State(state): State<ApplyState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Unreadable application body");
            return submission_failed();
        }
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Unparseable application body");
            return submission_failed();
        }
    };

    if let Some(field) = first_missing_field(&payload) {
        warn!(field, "Application rejected: missing field");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": format!("Missing {field}") })),
        )
            .into_response();
    }

    let created_at = Utc::now();
    let lead = NewLead {
        document: lead_document(payload, created_at),
        source: SOURCE_TAG.to_string(),
        created_at,
    };

    match state.db.insert_lead(&lead).await {
        Ok(id) => {
            info!(lead_id = %id, "Application stored");
            Json(serde_json::json!({ "ok": true })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to store application");
            submission_failed()
        }
    }
}

fn submission_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Submission failed" })),
    )
        .into_response()
}

/// JavaScript-style truthiness over a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First required field that is absent or falsy. A non-object body has no
/// fields, so it fails on `name`.
pub fn first_missing_field(payload: &Value) -> Option<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .find(|field| !payload.get(*field).is_some_and(is_truthy))
}

/// The stored document: every submitted field verbatim, then the server
/// timestamp and source tag (which win over client keys of the same name).
pub fn lead_document(payload: Value, created_at: DateTime<Utc>) -> Value {
    let mut fields = match payload {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    fields.insert(
        "createdAt".to_string(),
        Value::String(created_at.to_rfc3339()),
    );
    fields.insert("source".to_string(), Value::String(SOURCE_TAG.to_string()));
    Value::Object(fields)
}
