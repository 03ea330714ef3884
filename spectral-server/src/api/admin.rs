//! Admin routes: table counts, sample data and wiping the database
//!
//! Only mounted when `admin_enabled` is set.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use spectral_common::db::admin::{self, TableCounts};
use spectral_common::db::seeding::{self, SeedReport};
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// GET /admin
pub async fn get_counts(State(state): State<AppState>) -> ApiResult<Json<TableCounts>> {
    Ok(Json(admin::table_counts(&state.db).await?))
}

/// POST /admin/seed/:target
///
/// `target` is `user`, `session` or `torgo`. Each target seeds the ones
/// before it as well.
pub async fn seed(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> ApiResult<Json<SeedReport>> {
    let report = match target.as_str() {
        "user" => seeding::seed_sample_user(&state.db).await?,
        "session" => seeding::seed_sample_session(&state.db).await?,
        "torgo" => seeding::seed_sample_torgo(&state.db, &state.config.samples_dir).await?,
        other => return Err(ApiError::NotFound(format!("Unknown seed target: {}", other))),
    };

    Ok(Json(report))
}

/// POST /admin/delete-all
pub async fn delete_all(State(state): State<AppState>) -> ApiResult<StatusCode> {
    admin::delete_all_data(&state.db).await?;
    info!("All data deleted through admin route");
    Ok(StatusCode::NO_CONTENT)
}

/// Build admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(get_counts))
        .route("/admin/seed/:target", post(seed))
        .route("/admin/delete-all", post(delete_all))
}
