//! Login sessions: signup, login, logout and the authentication middleware
//!
//! The session token travels in the `auth_session` cookie. Protected routes
//! find the logged-in user as a [`CurrentUser`] request extension.

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use spectral_common::config::Config;
use spectral_common::db::users::{self, CreateUserOutcome, NewUser};
use spectral_common::db::{auth_sessions, User};
use tracing::{debug, info};

use crate::{ApiError, ApiResult, AppState};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "auth_session";

/// The user owning the request's login session
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Token of the request's login session
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Authentication middleware
///
/// Resolves the session cookie to a user. Returns 401 Unauthorized when the
/// cookie is missing, unknown or expired.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let not_logged_in = || ApiError::Unauthorized("Not logged in".to_string());

    let token = session_token(request.headers()).ok_or_else(not_logged_in)?;
    let user = auth_sessions::validate(&state.db, &token)
        .await?
        .ok_or_else(not_logged_in)?;

    debug!(user_id = %user.id, "Authenticated request");

    request.extensions_mut().insert(CurrentUser(user));
    request.extensions_mut().insert(SessionToken(token));

    Ok(next.run(request).await)
}

/// Value of the session cookie, if present
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

fn session_cookie(config: &Config, token: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Start a login session and answer with its cookie and the user
async fn logged_in_response(state: &AppState, user: User) -> ApiResult<Response> {
    let ttl = chrono::Duration::days(state.config.session_ttl_days);
    let session = auth_sessions::create(&state.db, &user.id, ttl).await?;
    let cookie = session_cookie(&state.config, &session.id, ttl.num_seconds());

    Ok(([(SET_COOKIE, cookie)], Json(json!({ "user": user }))).into_response())
}

/// Signup form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub privacy_ack: bool,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Check a signup form field by field
pub fn validate_signup(form: &SignupRequest) -> ApiResult<()> {
    let username_len = form.username.chars().count();
    if !(2..=50).contains(&username_len) {
        return Err(ApiError::invalid_field(
            "username",
            "Username must be between 2 and 50 characters",
        ));
    }

    if !is_valid_email(&form.email) {
        return Err(ApiError::invalid_field("email", "Invalid email"));
    }

    let password_len = form.password.chars().count();
    if !(8..=50).contains(&password_len) {
        return Err(ApiError::invalid_field(
            "password",
            "Password must be between 8 and 50 characters",
        ));
    }

    if !form.privacy_ack {
        return Err(ApiError::invalid_field(
            "privacyAck",
            "Did not acknowledge privacy policy",
        ));
    }

    Ok(())
}

/// POST /signup
///
/// Creates the account and logs it in.
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupRequest>,
) -> ApiResult<Response> {
    validate_signup(&form)?;

    let outcome = users::create_user(
        &state.db,
        NewUser {
            id: None,
            username: &form.username,
            email: &form.email,
            password: &form.password,
        },
    )
    .await?;

    let user_id = match outcome {
        CreateUserOutcome::Created { user_id } => user_id,
        CreateUserOutcome::EmailInUse => {
            return Err(ApiError::invalid_field("email", "Email is already in use"))
        }
        CreateUserOutcome::UsernameInUse => {
            return Err(ApiError::invalid_field(
                "username",
                "Username is already in use",
            ))
        }
    };

    let user = users::get_user(&state.db, &user_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("user {} vanished after signup", user_id)))?;

    logged_in_response(&state, user).await
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginRequest>,
) -> ApiResult<Response> {
    let user = users::verify_user(&state.db, &form.username, &form.password)
        .await?
        .ok_or_else(|| ApiError::invalid_field("username", "Invalid username or password"))?;

    info!(user_id = %user.id, "User logged in");
    logged_in_response(&state, user).await
}

/// POST /logout
///
/// Ends the current login session and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<Response> {
    auth_sessions::invalidate(&state.db, &token).await?;

    let cookie = session_cookie(&state.config, "", 0);
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response())
}

/// Public routes: signup and login
pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Routes that need a login session
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}
