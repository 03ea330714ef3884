//! Uploaded audio files

use super::models::FileRecord;
use crate::auth::generate_id;
use crate::state::FileState;
use crate::Result;
use chrono::Utc;
use serde_json::Value;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

/// A file to store
#[derive(Debug, Clone)]
pub struct NewFile<'a> {
    /// Fixed id, used for seeded files; random when `None`
    pub id: Option<&'a str>,
    pub name: &'a str,
    pub data: &'a [u8],
    pub session: &'a str,
    pub uploader: Option<&'a str>,
    pub ground_truth: Option<&'a str>,
}

const FILE_COLUMNS: &str = "id, name, creation_time, modified_time, uploader, session, \
                            ephemeral, ground_truth, LENGTH(data) AS size";

/// Store a file. Returns its id.
pub async fn upload<'e, E>(executor: E, file: NewFile<'_>) -> Result<String>
where
    E: SqliteExecutor<'e>,
{
    let id = file.id.map(str::to_string).unwrap_or_else(generate_id);
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO files (id, name, data, creation_time, modified_time, uploader, session, ground_truth)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(file.name)
    .bind(file.data)
    .bind(now)
    .bind(now)
    .bind(file.uploader)
    .bind(file.session)
    .bind(file.ground_truth)
    .execute(executor)
    .await?;

    info!(file_id = %id, session = %file.session, bytes = file.data.len(), "Stored file");
    Ok(id)
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<FileRecord>> {
    Ok(
        sqlx::query_as(&format!("SELECT {} FROM files WHERE id = ?", FILE_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Whether the file exists and was uploaded by `user_id`
pub async fn is_owned_by(pool: &SqlitePool, id: &str, user_id: &str) -> Result<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT id FROM files WHERE id = ? AND uploader = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}

/// Name of a file owned by `user_id`
pub async fn fetch_name(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Option<String>> {
    let name: Option<String> = sqlx::query_scalar("SELECT name FROM files WHERE id = ? AND uploader = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    if name.is_some() {
        debug!(file_id = %id, "File found");
    }
    Ok(name)
}

/// Audio data of a file owned by `user_id`
pub async fn fetch_data(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Option<Vec<u8>>> {
    let data: Option<Vec<u8>> = sqlx::query_scalar("SELECT data FROM files WHERE id = ? AND uploader = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    if data.is_some() {
        debug!(file_id = %id, "File found");
    }
    Ok(data)
}

/// Delete a file of `session` owned by `user_id`. Returns whether a file was deleted.
pub async fn delete_owned(
    pool: &SqlitePool,
    id: &str,
    session: &str,
    user_id: &str,
) -> Result<bool> {
    let result = sqlx::query("DELETE FROM files WHERE id = ? AND session = ? AND uploader = ?")
        .bind(id)
        .bind(session)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_for_session(pool: &SqlitePool, session: &str) -> Result<Vec<FileRecord>> {
    Ok(sqlx::query_as(&format!(
        "SELECT {} FROM files WHERE session = ? ORDER BY creation_time, name",
        FILE_COLUMNS
    ))
    .bind(session)
    .fetch_all(pool)
    .await?)
}

/// State of every file in a session.
///
/// Id and name come from the row; the ground truth column fills in a
/// missing ground truth. Unusable stored state is replaced by the default.
pub async fn load_file_states(pool: &SqlitePool, session: &str) -> Result<Vec<FileState>> {
    let rows: Vec<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT id, name, ground_truth, state FROM files WHERE session = ? ORDER BY creation_time, name",
    )
    .bind(session)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, ground_truth, state)| {
            let stored = state.map(|text| serde_json::from_str(&text).unwrap_or(Value::String(text)));
            let mut file_state = FileState::for_stored_file(&id, &name, stored.as_ref());
            if file_state.ground_truth.is_none() {
                file_state.ground_truth = ground_truth;
            }
            file_state
        })
        .collect())
}

/// Store the state of a file owned by `user_id`. Returns whether the file was found.
pub async fn save_state(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    state: &FileState,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE files SET state = ?, modified_time = ? WHERE id = ? AND uploader = ?",
    )
    .bind(serde_json::to_string(state)?)
    .bind(Utc::now())
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_for_uploader(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE uploader = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?)
}

pub async fn count_files(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM files")
        .fetch_one(pool)
        .await?)
}
