//! Recorder: prompt files and bulk import of recordings

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use spectral_common::db::sessions::{self, SessionFile};
use spectral_common::prompts::{parse_prompt_file, Prompt};
use tracing::info;

use super::form::Form;
use super::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

/// One recording listed in the `data` field of an import
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRecording {
    pub name: String,
    #[serde(default)]
    pub ground_truth: Option<String>,
}

/// POST /recorder/import
///
/// Creates a session named by the `fileName` field holding every recording
/// listed in `data`. Each recording's audio is the form part of the same name.
pub async fn import_recordings(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form = Form::read(multipart).await?;

    let session_name = form
        .text("fileName")?
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::invalid_field("fileName", "Invalid session name"))?;

    let listing = form
        .text("data")?
        .ok_or_else(|| ApiError::BadRequest("No data provided".to_string()))?;
    let recordings: Vec<ImportedRecording> = serde_json::from_str(&listing)
        .map_err(|e| ApiError::invalid_field("data", format!("Invalid recording list: {}", e)))?;

    let mut uploads = Vec::with_capacity(recordings.len());
    for recording in &recordings {
        let part = form.get(&recording.name).ok_or_else(|| {
            ApiError::BadRequest(format!("No audio provided for {}", recording.name))
        })?;
        uploads.push(SessionFile {
            name: &recording.name,
            data: &part.data,
            ground_truth: recording.ground_truth.as_deref(),
        });
    }

    let session_id =
        sessions::create_with_files(&state.db, session_name.trim(), &user.id, &uploads).await?;

    info!(
        session_id = %session_id,
        recordings = recordings.len(),
        "Imported recordings"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "sessionId": session_id })),
    )
        .into_response())
}

/// POST /recorder/prompts
///
/// Parses an uploaded prompt file.
pub async fn parse_prompts(body: String) -> Json<Vec<Prompt>> {
    Json(parse_prompt_file(&body))
}

/// Build recorder routes
pub fn recorder_routes() -> Router<AppState> {
    Router::new()
        .route("/recorder/import", post(import_recordings))
        .route("/recorder/prompts", post(parse_prompts))
}
