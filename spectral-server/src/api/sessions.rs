//! Analysis sessions: listing, creation, loading and file management

use axum::{
    extract::{Multipart, Path, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spectral_common::db::files::{self, NewFile};
use spectral_common::db::{sessions, SessionRecord};
use spectral_common::state::{FileState, SessionState};
use tracing::info;

use super::form::Form;
use super::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

/// The session, if the user owns it
pub(crate) async fn owned_session(
    state: &AppState,
    session_id: &str,
    user_id: &str,
) -> ApiResult<SessionRecord> {
    sessions::get_owned(&state.db, session_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
}

/// GET /session
///
/// Sessions of the current user, most recently modified first.
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<SessionRecord>>> {
    Ok(Json(sessions::list_for_owner(&state.db, &user.id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub session_name: String,
}

/// POST /session
///
/// Creates an empty session and redirects to it.
pub async fn create_session(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<Response> {
    let name = request.session_name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_field("sessionName", "Invalid session name"));
    }

    let session_id = sessions::create(&state.db, name, &user.id).await?;

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(LOCATION, format!("session/{}", session_id))],
    )
        .into_response())
}

/// Everything needed to open a session workspace
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub files: Vec<FileState>,
    pub state: SessionState,
    pub session_id: String,
}

/// GET /session/:id
pub async fn load_session(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    owned_session(&state, &session_id, &user.id).await?;

    let files = files::load_file_states(&state.db, &session_id).await?;
    let session_state = sessions::load_state(&state.db, &session_id).await?;

    Ok(Json(SessionResponse {
        files,
        state: session_state,
        session_id,
    }))
}

/// POST /session/:id/files
///
/// Uploads the multipart field `file` into the session.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Response> {
    owned_session(&state, &session_id, &user.id).await?;

    let form = Form::read(multipart).await?;
    let part = form
        .get("file")
        .filter(|part| part.file_name.is_some())
        .ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let name = part.file_name.as_deref().unwrap_or(&part.name);

    let file_id = files::upload(
        &state.db,
        NewFile {
            id: None,
            name,
            data: &part.data,
            session: &session_id,
            uploader: Some(&user.id),
            ground_truth: None,
        },
    )
    .await?;
    sessions::touch(&state.db, &session_id).await?;

    Ok((StatusCode::CREATED, Json(json!({ "fileId": file_id }))).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    pub file_id: String,
}

/// DELETE /session/:id/files
///
/// Deletes a file and drops it from every pane of the session.
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(session_id): Path<String>,
    Json(request): Json<DeleteFileRequest>,
) -> ApiResult<StatusCode> {
    owned_session(&state, &session_id, &user.id).await?;

    if !files::delete_owned(&state.db, &request.file_id, &session_id, &user.id).await? {
        return Err(ApiError::NotFound(format!(
            "File not found (id: {})",
            request.file_id
        )));
    }

    let mut session_state = sessions::load_state(&state.db, &session_id).await?;
    session_state.remove_file(&request.file_id);
    sessions::save_state_if_changed(&state.db, &session_id, &session_state).await?;

    info!(file_id = %request.file_id, session_id = %session_id, "Deleted file");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /session/:id/recording/:file_name
///
/// Stores a recording made in the browser. An empty `groundTruth` is stored as null.
pub async fn upload_recording(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((session_id, file_name)): Path<(String, String)>,
    multipart: Multipart,
) -> ApiResult<Response> {
    owned_session(&state, &session_id, &user.id).await?;

    let form = Form::read(multipart).await?;
    let recording = form.require("recording")?;
    let ground_truth = form.text("groundTruth")?.filter(|text| !text.is_empty());

    let file_id = files::upload(
        &state.db,
        NewFile {
            id: None,
            name: &file_name,
            data: &recording.data,
            session: &session_id,
            uploader: Some(&user.id),
            ground_truth: ground_truth.as_deref(),
        },
    )
    .await?;
    sessions::touch(&state.db, &session_id).await?;

    Ok((StatusCode::CREATED, Json(json!({ "fileId": file_id }))).into_response())
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(list_sessions).post(create_session))
        .route("/session/:id", get(load_session))
        .route("/session/:id/files", post(upload_file).delete(delete_file))
        .route("/session/:id/recording/:file_name", post(upload_recording))
}
