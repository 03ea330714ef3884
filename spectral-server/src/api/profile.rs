//! Profile page data and API key management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use spectral_common::db::{files, sessions, users, ApiKey, User};
use tracing::info;

use super::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

/// Profile response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: User,
    /// Files uploaded by the user
    pub file_count: i64,
    /// Sessions owned by the user
    pub session_count: i64,
}

/// GET /profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<ProfileResponse>> {
    let file_count = files::count_for_uploader(&state.db, &user.id).await?;
    let session_count = sessions::count_for_owner(&state.db, &user.id).await?;

    Ok(Json(ProfileResponse {
        user,
        file_count,
        session_count,
    }))
}

/// New API key
#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    pub name: String,
    pub model: String,
    pub key: String,
}

/// POST /profile/keys
///
/// Stores a key for a transcription model. A key with the same name is replaced.
pub async fn add_api_key(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<ApiKeyRequest>,
) -> ApiResult<StatusCode> {
    if request.name.trim().is_empty() {
        return Err(ApiError::invalid_field("name", "Key name must not be empty"));
    }
    if request.model.trim().is_empty() {
        return Err(ApiError::invalid_field("model", "Model must not be empty"));
    }
    if request.key.is_empty() {
        return Err(ApiError::invalid_field("key", "Key must not be empty"));
    }

    users::set_api_key(
        &state.db,
        &user.id,
        ApiKey {
            name: request.name,
            model: request.model,
            key: request.key,
        },
    )
    .await?;

    info!(user_id = %user.id, "Stored API key");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /profile/keys/:name
pub async fn delete_api_key(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    if !users::delete_api_key(&state.db, &user.id, &name).await? {
        return Err(ApiError::NotFound(format!("API key {}", name)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Build profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/keys", post(add_api_key))
        .route("/profile/keys/:name", delete(delete_api_key))
}
