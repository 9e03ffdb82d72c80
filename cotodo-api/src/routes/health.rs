/// Liveness probe
///
/// Unauthenticated. Reports the running version and whether the database
/// answers, so deploy tooling can tell a wedged pool from a dead process.
/// The probe itself always answers 200; `status` turns to `degraded` when
/// the database is unreachable.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use cotodo_shared::db::pool;
use serde::{Deserialize, Serialize};

/// Probe response body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,

    /// Running server version
    pub version: String,

    /// `reachable` or `unreachable`
    pub database: String,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let db_ok = pool::health_check(&state.db).await.is_ok();

    Ok(Json(HealthResponse {
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if db_ok { "reachable" } else { "unreachable" }.to_string(),
    }))
}
