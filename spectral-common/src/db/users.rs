//! User accounts

use super::models::{ApiKey, User, UserRow};
use crate::auth::{generate_id, hash_password, verify_password};
use crate::{Error, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::{info, warn};

/// Data needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    /// Fixed id, used for seeded accounts; random when `None`
    pub id: Option<&'a str>,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Outcome of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserOutcome {
    Created { user_id: String },
    EmailInUse,
    UsernameInUse,
}

const USER_COLUMNS: &str =
    "id, email, username, password_hash, api_keys, creation_time";

pub async fn create_user(pool: &SqlitePool, new_user: NewUser<'_>) -> Result<CreateUserOutcome> {
    let email_taken: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(new_user.email)
        .fetch_optional(pool)
        .await?;
    if email_taken.is_some() {
        return Ok(CreateUserOutcome::EmailInUse);
    }

    let username_taken: Option<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(new_user.username)
            .fetch_optional(pool)
            .await?;
    if username_taken.is_some() {
        return Ok(CreateUserOutcome::UsernameInUse);
    }

    let user_id = new_user
        .id
        .map(str::to_string)
        .unwrap_or_else(generate_id);
    let password_hash = hash_password(new_user.password)?;

    sqlx::query(
        r#"
        INSERT INTO users (id, email, username, password_hash, api_keys, creation_time)
        VALUES (?, ?, ?, ?, '[]', ?)
        "#,
    )
    .bind(&user_id)
    .bind(new_user.email)
    .bind(new_user.username)
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    info!(user_id = %user_id, username = %new_user.username, "Created user");

    Ok(CreateUserOutcome::Created { user_id })
}

/// Look up a user by username and check the password
pub async fn verify_user(pool: &SqlitePool, username: &str, password: &str) -> Result<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
            .bind(username)
            .fetch_optional(pool)
            .await?;

    Ok(row
        .filter(|row| verify_password(password, &row.password_hash))
        .map(UserRow::into_user))
}

pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(UserRow::into_user))
}

/// Read a user's API keys inside `tx`, holding the write lock until commit
async fn lock_api_keys(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    user_id: &str,
) -> Result<Vec<ApiKey>> {
    // Writing first takes the database write lock, so concurrent edits serialize
    let locked = sqlx::query("UPDATE users SET api_keys = api_keys WHERE id = ?")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    if locked.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user {}", user_id)));
    }

    let encoded: String = sqlx::query_scalar("SELECT api_keys FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

    Ok(serde_json::from_str(&encoded).unwrap_or_else(|e| {
        warn!(user_id = %user_id, "Invalid api_keys column, replacing: {}", e);
        Vec::new()
    }))
}

async fn store_api_keys(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    user_id: &str,
    keys: &[ApiKey],
) -> Result<()> {
    sqlx::query("UPDATE users SET api_keys = ? WHERE id = ?")
        .bind(serde_json::to_string(keys)?)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Add an API key, replacing any existing key with the same name
pub async fn set_api_key(pool: &SqlitePool, user_id: &str, key: ApiKey) -> Result<()> {
    let mut tx = pool.begin().await?;

    let mut keys = lock_api_keys(&mut tx, user_id).await?;
    keys.retain(|existing| existing.name != key.name);
    keys.push(key);
    store_api_keys(&mut tx, user_id, &keys).await?;

    tx.commit().await?;
    Ok(())
}

/// Remove an API key by name. Returns whether a key was removed.
pub async fn delete_api_key(pool: &SqlitePool, user_id: &str, name: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let mut keys = lock_api_keys(&mut tx, user_id).await?;
    let before = keys.len();
    keys.retain(|existing| existing.name != name);

    if keys.len() == before {
        tx.rollback().await?;
        return Ok(false);
    }

    store_api_keys(&mut tx, user_id, &keys).await?;
    tx.commit().await?;
    Ok(true)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?)
}
