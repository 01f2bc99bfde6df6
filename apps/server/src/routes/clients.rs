//! # Client Routes

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use optica_core::{Appointment, Client, ClientInput, Sale};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Client>>> {
    Ok(Json(state.db.clients().list().await?))
}

pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Client>>> {
    let Query(params) = params?;
    debug!(q = %params.q, "search_clients");
    Ok(Json(state.db.clients().search(&params.q).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    state
        .db
        .clients()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Client", &id))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ClientInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let Json(input) = payload?;
    let client = state.db.clients().create(input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// Full replacement of the editable fields.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ClientInput>, JsonRejection>,
) -> ApiResult<Json<Client>> {
    let Json(input) = payload?;
    Ok(Json(state.db.clients().update(&id, input).await?))
}

/// Sales and appointments keep their snapshot of the client's name.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.clients().remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn sales(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.db.sales().by_client(&id).await?))
}

/// Most recent first, past bookings included.
pub async fn appointments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(state.db.appointments().by_client(&id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app, call, create_client, create_sale};

    #[tokio::test]
    async fn test_client_crud() {
        let (app, _db) = app().await;

        let id = create_client(&app, "Ana Souza").await;

        let fetched = call(&app, "GET", &format!("/api/clients/{id}"), None, StatusCode::OK).await;
        assert_eq!(fetched["name"], "Ana Souza");
        assert_eq!(fetched["rightEye"]["spherical"], serde_json::Value::Null);

        let updated = call(
            &app,
            "PUT",
            &format!("/api/clients/{id}"),
            Some(json!({
                "name": "Ana S. Lima",
                "phone": "11 98888-1111",
                "rightEye": { "spherical": "-1.25", "axis": "90" }
            })),
            StatusCode::OK,
        )
        .await;
        assert_eq!(updated["rightEye"]["spherical"], "-1.25");

        let found = call(&app, "GET", "/api/clients/search?q=LIMA", None, StatusCode::OK).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        let empty = call(&app, "GET", "/api/clients/search?q=", None, StatusCode::OK).await;
        assert!(empty.as_array().unwrap().is_empty());

        call(&app, "DELETE", &format!("/api/clients/{id}"), None, StatusCode::NO_CONTENT).await;
        call(&app, "GET", &format!("/api/clients/{id}"), None, StatusCode::NOT_FOUND).await;
        call(&app, "DELETE", &format!("/api/clients/{id}"), None, StatusCode::NOT_FOUND).await;
    }

    #[tokio::test]
    async fn test_client_validation() {
        let (app, _db) = app().await;

        let err = call(
            &app,
            "POST",
            "/api/clients",
            Some(json!({ "name": "  ", "phone": "11 1234-5678" })),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!(err["code"], "VALIDATION_ERROR");

        // Missing required key is a JSON rejection, reported the same way
        let err = call(
            &app,
            "POST",
            "/api/clients",
            Some(json!({ "name": "Ana" })),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!(err["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_client_sales() {
        let (app, _db) = app().await;
        let id = create_client(&app, "Ana Souza").await;
        create_sale(&app, &id, 10_000).await;
        create_sale(&app, &id, 5_000).await;

        let sales = call(&app, "GET", &format!("/api/clients/{id}/sales"), None, StatusCode::OK).await;
        let numbers: Vec<i64> = sales
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["serviceOrderNumber"].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, vec![702, 701]);
    }

    #[tokio::test]
    async fn test_client_appointments() {
        let (app, _db) = app().await;
        let id = create_client(&app, "Ana Souza").await;
        let other = create_client(&app, "Bruno Lima").await;

        for (client, at) in [(&id, 1_772_456_400_000i64), (&id, 1_772_460_000_000), (&other, 1_772_463_600_000)] {
            call(
                &app,
                "POST",
                "/api/appointments",
                Some(json!({ "clientId": client, "date": at })),
                StatusCode::CREATED,
            )
            .await;
        }

        let booked = call(&app, "GET", &format!("/api/clients/{id}/appointments"), None, StatusCode::OK).await;
        let dates: Vec<i64> = booked
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["date"].as_i64().unwrap())
            .collect();
        assert_eq!(dates, vec![1_772_460_000_000, 1_772_456_400_000]);
    }

    #[tokio::test]
    async fn test_malformed_search_query() {
        let (app, _db) = app().await;
        let err = call(&app, "GET", "/api/clients/search?q=a&q=b", None, StatusCode::BAD_REQUEST).await;
        assert_eq!(err["code"], "VALIDATION_ERROR");
    }
}
