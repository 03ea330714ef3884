//! Analysis sessions and their workspace state

use super::files::{self, NewFile};
use super::models::SessionRecord;
use crate::auth::generate_id;
use crate::state::SessionState;
use crate::Result;
use chrono::Utc;
use serde_json::Value;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{info, trace, warn};

const SESSION_COLUMNS: &str = "id, name, owner, creation_time, modified_time";

/// Sessions of a user, most recently modified first
pub async fn list_for_owner(pool: &SqlitePool, owner: &str) -> Result<Vec<SessionRecord>> {
    Ok(sqlx::query_as(&format!(
        "SELECT {} FROM sessions WHERE owner = ? \
         ORDER BY modified_time DESC, creation_time DESC, name DESC",
        SESSION_COLUMNS
    ))
    .bind(owner)
    .fetch_all(pool)
    .await?)
}

/// Create a session with a random id
pub async fn create(pool: &SqlitePool, name: &str, owner: &str) -> Result<String> {
    let id = generate_id();
    create_with_id(pool, &id, name, owner, None).await?;
    Ok(id)
}

/// Create a session with a fixed id and optional initial state
pub async fn create_with_id<'e, E>(
    executor: E,
    id: &str,
    name: &str,
    owner: &str,
    state: Option<&SessionState>,
) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let encoded = state.map(serde_json::to_string).transpose()?;
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO sessions (id, name, owner, state, creation_time, modified_time)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(owner)
    .bind(encoded)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    info!(session_id = %id, owner = %owner, "Created session");
    Ok(())
}

/// Audio file stored together with a new session
#[derive(Debug, Clone)]
pub struct SessionFile<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
    pub ground_truth: Option<&'a str>,
}

/// Create a session holding `session_files`, all uploaded by `owner`.
///
/// Runs in one transaction: either the session and every file are stored,
/// or nothing is.
pub async fn create_with_files(
    pool: &SqlitePool,
    name: &str,
    owner: &str,
    session_files: &[SessionFile<'_>],
) -> Result<String> {
    let id = generate_id();
    let mut tx = pool.begin().await?;

    create_with_id(&mut *tx, &id, name, owner, None).await?;
    for file in session_files {
        files::upload(
            &mut *tx,
            NewFile {
                id: None,
                name: file.name,
                data: file.data,
                session: &id,
                uploader: Some(owner),
                ground_truth: file.ground_truth,
            },
        )
        .await?;
    }

    tx.commit().await?;
    Ok(id)
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<SessionRecord>> {
    Ok(
        sqlx::query_as(&format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// The session, if it exists and belongs to `owner`
pub async fn get_owned(pool: &SqlitePool, id: &str, owner: &str) -> Result<Option<SessionRecord>> {
    Ok(sqlx::query_as(&format!(
        "SELECT {} FROM sessions WHERE id = ? AND owner = ?",
        SESSION_COLUMNS
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?)
}

async fn stored_state(pool: &SqlitePool, id: &str) -> Result<Option<Value>> {
    let raw: Option<Option<String>> = sqlx::query_scalar("SELECT state FROM sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(match raw.flatten() {
        Some(text) => Some(serde_json::from_str(&text).unwrap_or(Value::String(text))),
        None => None,
    })
}

/// Load the workspace state of a session.
///
/// A missing state yields the default. A stored state that does not
/// validate is replaced by the default, which is written back.
pub async fn load_state(pool: &SqlitePool, id: &str) -> Result<SessionState> {
    let stored = stored_state(pool, id).await?.unwrap_or(Value::Null);

    match SessionState::parse(&stored) {
        Ok(state) => Ok(state),
        Err(e) => {
            warn!(session_id = %id, "Found invalid state in database, resetting to default: {}", e);
            let state = SessionState::default();
            reset_state(pool, id, &state).await?;
            Ok(state)
        }
    }
}

/// Overwrite the state of one session without touching `modified_time`
pub async fn reset_state(pool: &SqlitePool, id: &str, state: &SessionState) -> Result<()> {
    sqlx::query("UPDATE sessions SET state = ? WHERE id = ?")
        .bind(serde_json::to_string(state)?)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Store a new workspace state unless it equals the stored one.
///
/// Returns whether the database was written. A write also bumps
/// `modified_time`.
pub async fn save_state_if_changed(pool: &SqlitePool, id: &str, state: &SessionState) -> Result<bool> {
    let new_value = serde_json::to_value(state)?;

    if stored_state(pool, id).await?.as_ref() == Some(&new_value) {
        trace!(session_id = %id, "Not updating state since it has not been modified");
        return Ok(false);
    }

    sqlx::query("UPDATE sessions SET state = ?, modified_time = ? WHERE id = ?")
        .bind(new_value.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(true)
}

/// Mark a session as modified, e.g. after a file upload
pub async fn touch(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("UPDATE sessions SET modified_time = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a session together with its files
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM files WHERE session = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_for_owner(pool: &SqlitePool, owner: &str) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE owner = ?")
        .bind(owner)
        .fetch_one(pool)
        .await?)
}

pub async fn count_sessions(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(pool)
        .await?)
}
