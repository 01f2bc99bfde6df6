//! # Sale Routes
//!
//! Service orders and the payments recorded against them.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use optica_core::{
    NewPayment, NewSale, Payment, PaymentAdded, Sale, SalePatch, SaleStatus, SalesTotals,
};

const DEFAULT_RECENT_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberResponse {
    pub service_order_number: i64,
}

pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Sale>>> {
    let Query(params) = params?;
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<SaleStatus>)
        .transpose()?;

    Ok(Json(state.db.sales().list(status).await?))
}

pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Sale>>> {
    let Query(params) = params?;
    debug!(q = %params.q, "search_sales");
    Ok(Json(state.db.sales().search(&params.q).await?))
}

pub async fn next_service_order_number(
    State(state): State<AppState>,
) -> ApiResult<Json<NextNumberResponse>> {
    let service_order_number = state.db.sales().next_service_order_number().await?;
    Ok(Json(NextNumberResponse {
        service_order_number,
    }))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<SalesTotals>> {
    Ok(Json(state.db.sales().totals().await?))
}

pub async fn recent(
    State(state): State<AppState>,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Sale>>> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(state.db.sales().recent(limit).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Sale>> {
    state
        .db
        .sales()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewSale>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let Json(input) = payload?;
    debug!(client_id = %input.client_id, items = input.items.len(), "create_sale");

    let sale = state.db.sales().create(input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SalePatch>, JsonRejection>,
) -> ApiResult<Json<Sale>> {
    let Json(patch) = payload?;
    Ok(Json(state.db.sales().update(&id, patch).await?))
}

/// Deletes the sale with its items and payments.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.sales().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Payment>>> {
    if state.db.sales().get(&id).await?.is_none() {
        return Err(ApiError::not_found("Sale", &id));
    }
    Ok(Json(state.db.sales().payments(&id).await?))
}

pub async fn add_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewPayment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PaymentAdded>)> {
    let Json(input) = payload?;
    debug!(sale_id = %id, amount_cents = input.amount_cents, "add_payment");

    let added = state.db.sales().add_payment(&id, input).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

/// Returns the sale after the payment has been reversed.
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    Ok(Json(state.db.sales().delete_payment(&id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::routes::test_support::{app, call, create_client, create_sale};

    async fn pay(app: &axum::Router, sale_id: &str, amount: i64, expected: StatusCode) -> Value {
        call(
            app,
            "POST",
            &format!("/api/sales/{sale_id}/payments"),
            Some(json!({ "amountCents": amount, "paymentMethod": "cash" })),
            expected,
        )
        .await
    }

    #[tokio::test]
    async fn test_payment_flow() {
        let (app, _db) = app().await;
        let client_id = create_client(&app, "Ana Souza").await;

        let next = call(&app, "GET", "/api/sales/next-service-order-number", None, StatusCode::OK).await;
        assert_eq!(next["serviceOrderNumber"], 701);

        let sale = create_sale(&app, &client_id, 10_000).await;
        let sale_id = sale["id"].as_str().unwrap();
        assert_eq!(sale["serviceOrderNumber"], 701);
        assert_eq!(sale["status"], "pending");

        let first = pay(&app, sale_id, 6_000, StatusCode::CREATED).await;
        assert_eq!(first["success"], true);
        assert_eq!(first["sale"]["pendingAmountCents"], 4_000);
        assert_eq!(first["sale"]["status"], "partial");

        let err = pay(&app, sale_id, 5_000, StatusCode::BAD_REQUEST).await;
        assert_eq!(err["code"], "VALIDATION_ERROR");

        let second = pay(&app, sale_id, 4_000, StatusCode::CREATED).await;
        assert_eq!(second["sale"]["status"], "paid");

        let payment_id = second["paymentId"].as_str().unwrap();
        let reverted = call(
            &app,
            "DELETE",
            &format!("/api/payments/{payment_id}"),
            None,
            StatusCode::OK,
        )
        .await;
        assert_eq!(reverted["paidAmountCents"], 6_000);
        assert_eq!(reverted["status"], "partial");

        let payments = call(
            &app,
            "GET",
            &format!("/api/sales/{sale_id}/payments"),
            None,
            StatusCode::OK,
        )
        .await;
        assert_eq!(payments.as_array().unwrap().len(), 1);

        let stats = call(&app, "GET", "/api/sales/stats", None, StatusCode::OK).await;
        assert_eq!(stats["totalCount"], 1);
        assert_eq!(stats["totalPaid"], 6_000);
        assert_eq!(stats["totalPending"], 4_000);
    }

    #[tokio::test]
    async fn test_create_errors() {
        let (app, _db) = app().await;
        let client_id = create_client(&app, "Ana Souza").await;

        let mut body = json!({
            "clientId": client_id,
            "clientName": "Ana Souza",
            "items": [{ "description": "Lente", "quantity": 1, "unitPriceCents": 10_000 }],
            "paymentMethod": "pix",
            "serviceOrderNumber": 900
        });
        call(&app, "POST", "/api/sales", Some(body.clone()), StatusCode::CREATED).await;

        let err = call(&app, "POST", "/api/sales", Some(body.clone()), StatusCode::CONFLICT).await;
        assert_eq!(err["code"], "CONFLICT");

        body["serviceOrderNumber"] = Value::Null;
        body["totalCents"] = json!(1);
        call(&app, "POST", "/api/sales", Some(body.clone()), StatusCode::BAD_REQUEST).await;

        body["totalCents"] = Value::Null;
        body["clientId"] = json!("550e8400-e29b-41d4-a716-446655440000");
        call(&app, "POST", "/api/sales", Some(body), StatusCode::NOT_FOUND).await;
    }

    #[tokio::test]
    async fn test_patch_search_and_delete() {
        let (app, _db) = app().await;
        let client_id = create_client(&app, "Ana Souza").await;
        let sale = create_sale(&app, &client_id, 10_000).await;
        let sale_id = sale["id"].as_str().unwrap();

        let patched = call(
            &app,
            "PATCH",
            &format!("/api/sales/{sale_id}"),
            Some(json!({ "status": "cancelled", "deliveryDate": "2026-11-02" })),
            StatusCode::OK,
        )
        .await;
        assert_eq!(patched["status"], "cancelled");
        assert_eq!(patched["deliveryDate"], "2026-11-02");

        let cleared = call(
            &app,
            "PATCH",
            &format!("/api/sales/{sale_id}"),
            Some(json!({ "deliveryDate": null })),
            StatusCode::OK,
        )
        .await;
        assert_eq!(cleared["deliveryDate"], Value::Null);

        let cancelled = call(&app, "GET", "/api/sales?status=cancelled", None, StatusCode::OK).await;
        assert_eq!(cancelled.as_array().unwrap().len(), 1);
        call(&app, "GET", "/api/sales?status=bogus", None, StatusCode::BAD_REQUEST).await;

        let found = call(&app, "GET", "/api/sales/search?q=701", None, StatusCode::OK).await;
        assert_eq!(found[0]["id"], sale_id);
        let recent = call(&app, "GET", "/api/sales/recent?limit=5", None, StatusCode::OK).await;
        assert!(recent.as_array().unwrap().is_empty());
        let err = call(&app, "GET", "/api/sales/recent?limit=-1", None, StatusCode::BAD_REQUEST).await;
        assert_eq!(err["code"], "VALIDATION_ERROR");
        let err = call(&app, "GET", "/api/sales/search?q=1&q=2", None, StatusCode::BAD_REQUEST).await;
        assert_eq!(err["code"], "VALIDATION_ERROR");

        call(&app, "DELETE", &format!("/api/sales/{sale_id}"), None, StatusCode::NO_CONTENT).await;
        call(&app, "GET", &format!("/api/sales/{sale_id}"), None, StatusCode::NOT_FOUND).await;
        call(
            &app,
            "GET",
            &format!("/api/sales/{sale_id}/payments"),
            None,
            StatusCode::NOT_FOUND,
        )
        .await;
    }

    #[tokio::test]
    async fn test_patch_rejects_overflowing_balance() {
        let (app, _db) = app().await;
        let client_id = create_client(&app, "Ana Souza").await;
        let sale = create_sale(&app, &client_id, 10_000).await;
        let uri = format!("/api/sales/{}", sale["id"].as_str().unwrap());

        for body in [
            json!({ "paidAmountCents": i64::MAX, "pendingAmountCents": 1 }),
            json!({ "pendingAmountCents": i64::MIN }),
            json!({ "paidAmountCents": i64::MIN }),
        ] {
            let err = call(&app, "PATCH", &uri, Some(body), StatusCode::BAD_REQUEST).await;
            assert_eq!(err["code"], "VALIDATION_ERROR");
        }

        let unchanged = call(&app, "GET", &uri, None, StatusCode::OK).await;
        assert_eq!(unchanged["paidAmountCents"], 0);
        assert_eq!(unchanged["pendingAmountCents"], 10_000);
    }
}
