//! # Receipt Routes
//!
//! `receipt` is the regular API read. `receipt-data` is fetched by the
//! standalone receipt page, possibly from another origin, so it answers
//! with `Access-Control-Allow-Origin: *` and a bare `{ "error": ... }`
//! body on failure.

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use optica_core::ReceiptData;

pub async fn receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReceiptData>> {
    state
        .db
        .sales()
        .receipt(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

/// `GET /api/sales/{id}/receipt-data`
///
/// ```text
/// 200 { "sale": {...}, "client": {...} | null, "profile": {...} | null }
/// 404 { "error": "Sale not found" }
/// ```
pub async fn receipt_data(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    debug!(sale_id = %id, "receipt_data");

    let mut response = match state.db.sales().receipt(&id).await {
        Ok(Some(data)) => (StatusCode::OK, Json(data)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Sale not found" })),
        )
            .into_response(),
        Err(err) => {
            error!(sale_id = %id, error = %err, "Failed to load receipt data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to load receipt data" })),
            )
                .into_response()
        }
    };

    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
