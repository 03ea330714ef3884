//! Mode analysis through the kernel

use axum::{
    extract::{Path, State},
    routing::post,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use spectral_common::db::files;
use spectral_common::modes::{ComputedData, ModeName};
use spectral_common::state::FileState;
use tracing::debug;

use super::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub file_state: Value,
}

/// POST /analysis/modes/:mode
///
/// Computes the data of one mode for a file the user owns. The kernel's
/// answer is validated against the mode's data shape before it is returned.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(mode): Path<String>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<Json<ComputedData>> {
    let mode: ModeName = mode.parse()?;
    let file_state = FileState::parse(&request.file_state)?;

    if !files::is_owned_by(&state.db, &file_state.id, &user.id).await? {
        return Err(ApiError::NotFound(format!(
            "File not found (id: {})",
            file_state.id
        )));
    }

    debug!(mode = %mode, file_id = %file_state.id, "Analyzing file");

    let data = state.kernel.computed_file_data(mode, &file_state).await?;
    Ok(Json(data))
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/analysis/modes/:mode", post(analyze))
}
