//! Login sessions backing the session cookie

use super::models::{AuthSession, User};
use super::users::get_user;
use crate::auth::generate_session_token;
use crate::{Error, Result};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

/// Start a login session for a user
pub async fn create(pool: &SqlitePool, user_id: &str, ttl: Duration) -> Result<AuthSession> {
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| Error::Internal(format!("Session lifetime out of range: {}", ttl)))?;

    let session = AuthSession {
        id: generate_session_token(),
        user_id: user_id.to_string(),
        expires_at,
    };

    sqlx::query("INSERT INTO user_sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .execute(pool)
        .await?;

    debug!(user_id = %user_id, "Created login session");

    Ok(session)
}

/// Resolve a session token to its user. Expired sessions are deleted.
pub async fn validate(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let session: Option<AuthSession> =
        sqlx::query_as("SELECT id, user_id, expires_at FROM user_sessions WHERE id = ?")
            .bind(token)
            .fetch_optional(pool)
            .await?;

    let Some(session) = session else {
        return Ok(None);
    };

    if session.is_expired(Utc::now()) {
        invalidate(pool, &session.id).await?;
        return Ok(None);
    }

    get_user(pool, &session.user_id).await
}

pub async fn invalidate(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM user_sessions WHERE id = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete every expired session. Returns the number removed.
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= ?")
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
