use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;
use optica_db::migrations::migration_status;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub migrations_applied: usize,
    pub migrations_embedded: usize,
}

/// 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;
    let (embedded, applied) = match migration_status(state.db.pool()).await {
        Ok(counts) => counts,
        Err(e) => {
            warn!(error = %e, "Failed to read migration status");
            (0, 0)
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database { "ok" } else { "unavailable" },
            database,
            migrations_applied: applied,
            migrations_embedded: embedded,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{app, call};

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = app().await;
        let body = call(&app, "GET", "/health", None, StatusCode::OK).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["migrationsApplied"], body["migrationsEmbedded"]);
    }

    #[tokio::test]
    async fn test_health_when_database_closed() {
        let (app, db) = app().await;
        db.close().await;

        let body = call(&app, "GET", "/health", None, StatusCode::SERVICE_UNAVAILABLE).await;
        assert_eq!(body["status"], "unavailable");
        assert_eq!(body["database"], false);
        assert_eq!(body["migrationsApplied"], 0);
    }
}
