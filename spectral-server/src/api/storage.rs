//! File data and workspace state sync

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::Value;
use spectral_common::db::{files, sessions};
use spectral_common::state::{FileState, SessionState};
use std::collections::HashMap;
use tracing::{debug, trace};

use super::sessions::owned_session;
use super::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

fn file_not_found(file_id: &str) -> ApiError {
    ApiError::NotFound(format!("{} not found.", file_id))
}

/// GET /db/file/:id
///
/// The audio data of a file, or its name as JSON when `?name` is given.
pub async fn get_file(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(file_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    if query.contains_key("name") {
        let name = files::fetch_name(&state.db, &file_id, &user.id)
            .await?
            .ok_or_else(|| file_not_found(&file_id))?;
        return Ok(Json(name).into_response());
    }

    let data = files::fetch_data(&state.db, &file_id, &user.id)
        .await?
        .ok_or_else(|| file_not_found(&file_id))?;

    Ok(([(CONTENT_TYPE, "audio")], data).into_response())
}

/// PUT /db/file/:id/state
///
/// Validates and stores the state of a file. Responds with the stored state.
pub async fn put_file_state(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(file_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<FileState>> {
    let parsed = FileState::parse(&body)?;

    // Identity always comes from the stored file
    let name = files::fetch_name(&state.db, &file_id, &user.id)
        .await?
        .ok_or_else(|| file_not_found(&file_id))?;
    let file_state = FileState {
        id: file_id.clone(),
        name,
        ..parsed
    };

    files::save_state(&state.db, &file_id, &user.id, &file_state).await?;
    debug!(file_id = %file_id, "Stored file state");

    Ok(Json(file_state))
}

/// POST /db/session/:id
///
/// Validates and stores the workspace state of a session. An unchanged state
/// is not written.
pub async fn post_session_state(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(session_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<StatusCode> {
    let session_state = SessionState::parse(&body)?;
    owned_session(&state, &session_id, &user.id).await?;

    if sessions::save_state_if_changed(&state.db, &session_id, &session_state).await? {
        trace!(session_id = %session_id, "Stored session state");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Build storage routes
pub fn storage_routes() -> Router<AppState> {
    Router::new()
        .route("/db/file/:id", get(get_file))
        .route("/db/file/:id/state", put(put_file_state))
        .route("/db/session/:id", post(post_session_state))
}
