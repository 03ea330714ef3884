//! Kernel proxy
//!
//! `/api/*path` forwards GET and POST requests to the kernel after checking
//! that the user owns the file named by the `file-id` header. Transcription
//! requests for hosted models get the user's stored API key attached.

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::Response,
    routing::get,
    Extension, Router,
};
use spectral_common::db::{files, User};
use tracing::debug;

use super::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

/// Header naming the file a proxied request is about
pub const FILE_ID_HEADER: &str = "file-id";

/// Header carrying the transcription API key to the kernel
pub const API_KEY_HEADER: &str = "apikey";

/// Sent when the request needs no key
const PLACEHOLDER_API_KEY: &str = "non-existent...";

/// Transcription models that need a user-provided key
pub const KEY_REQUIRING_MODELS: [&str; 2] = ["whisper", "deepgram"];

/// Response headers that describe the kernel connection rather than the body
const HOP_HEADERS: [&str; 3] = ["connection", "transfer-encoding", "content-length"];

/// Request headers never forwarded to the kernel
const PRIVATE_HEADERS: [&str; 1] = ["cookie"];

/// API key to send along with a request to `path`
pub fn api_key_for_path(path: &str, user: &User) -> ApiResult<String> {
    let Some(rest) = path.strip_prefix("transcription/") else {
        return Ok(PLACEHOLDER_API_KEY.to_string());
    };

    let model = rest.split('/').next().unwrap_or_default();
    if !KEY_REQUIRING_MODELS.contains(&model) {
        return Ok(PLACEHOLDER_API_KEY.to_string());
    }

    user.api_key_for(model)
        .map(|key| key.key.clone())
        .ok_or_else(|| ApiError::NotFound(format!("No key provided for {}.", model)))
}

fn to_kernel_headers(headers: &HeaderMap) -> reqwest::header::HeaderMap {
    let mut converted = reqwest::header::HeaderMap::new();

    for (name, value) in headers {
        if PRIVATE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        let name = reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes());
        let value = reqwest::header::HeaderValue::from_bytes(value.as_bytes());
        if let (Ok(name), Ok(value)) = (name, value) {
            converted.append(name, value);
        }
    }

    converted
}

fn from_kernel_headers(headers: &reqwest::header::HeaderMap) -> HeaderMap {
    let mut converted = HeaderMap::new();

    for (name, value) in headers {
        if HOP_HEADERS.contains(&name.as_str()) {
            continue;
        }
        let name = HeaderName::from_bytes(name.as_str().as_bytes());
        let value = HeaderValue::from_bytes(value.as_bytes());
        if let (Ok(name), Ok(value)) = (name, value) {
            converted.append(name, value);
        }
    }

    converted
}

/// GET|POST /api/*path
pub async fn proxy(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let file_id = headers
        .get(FILE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No file-id header".to_string()))?;

    if !files::is_owned_by(&state.db, file_id, &user.id).await? {
        return Err(ApiError::NotFound(format!("File not found (id: {})", file_id)));
    }

    let api_key = api_key_for_path(&path, &user)?;

    let mut kernel_headers = to_kernel_headers(&headers);
    let api_key = reqwest::header::HeaderValue::from_str(&api_key)
        .map_err(|_| ApiError::BadRequest("API key is not a valid header value".to_string()))?;
    kernel_headers.insert(API_KEY_HEADER, api_key);

    let kernel_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    debug!(path = %path, file_id = %file_id, "Proxying request to kernel");

    let kernel_response = state
        .kernel
        .forward(kernel_method, &path, uri.query(), kernel_headers, body.to_vec())
        .await?;

    let status = StatusCode::from_u16(kernel_response.status().as_u16())
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;
    let response_headers = from_kernel_headers(kernel_response.headers());
    let response_body = kernel_response
        .bytes()
        .await
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;

    let mut response = Response::new(Body::from(response_body));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;

    Ok(response)
}

/// Build proxy routes
pub fn proxy_routes() -> Router<AppState> {
    Router::new().route("/api/*path", get(proxy).post(proxy))
}
