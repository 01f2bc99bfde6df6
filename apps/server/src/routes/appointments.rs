//! # Appointment Routes
//!
//! `date` query parameters take either `YYYY-MM-DD` or epoch milliseconds
//! and default to the shop's current day.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use optica_core::schedule::{local_day, parse_day};
use optica_core::{AgendaSlot, Appointment, NewAppointment};

#[derive(Debug, Deserialize)]
pub struct DayParams {
    pub date: Option<String>,
}

impl DayParams {
    fn day(&self, state: &AppState) -> ApiResult<NaiveDate> {
        match self.date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(raw) => Ok(parse_day(raw, state.offset)?),
            None => Ok(local_day(Utc::now(), state.offset)),
        }
    }
}

pub async fn list_by_day(
    State(state): State<AppState>,
    params: Result<Query<DayParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Appointment>>> {
    let Query(params) = params?;
    let day = params.day(&state)?;
    Ok(Json(
        state.db.appointments().list_by_day(day, state.offset).await?,
    ))
}

pub async fn slots(
    State(state): State<AppState>,
    params: Result<Query<DayParams>, QueryRejection>,
) -> ApiResult<Json<Vec<AgendaSlot>>> {
    let Query(params) = params?;
    let day = params.day(&state)?;
    Ok(Json(state.db.appointments().agenda(day, state.offset).await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewAppointment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let Json(input) = payload?;
    let appointment = state.db.appointments().create(input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    state
        .db
        .appointments()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Appointment", &id))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.appointments().cancel(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
