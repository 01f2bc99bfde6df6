//! # Profile Routes

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::state::AppState;
use optica_core::{Profile, ProfileInput};

/// `null` until the profile is saved for the first time.
pub async fn get(State(state): State<AppState>) -> ApiResult<Json<Option<Profile>>> {
    Ok(Json(state.db.profile().get().await?))
}

pub async fn save(
    State(state): State<AppState>,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> ApiResult<Json<Profile>> {
    let Json(input) = payload?;
    Ok(Json(state.db.profile().save(input).await?))
}
