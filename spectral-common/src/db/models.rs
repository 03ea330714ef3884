//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key for a third-party transcription model, stored per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    /// User-chosen label, unique per user
    pub name: String,
    /// Transcription model the key is for (e.g. "deepgram")
    pub model: String,
    pub key: String,
}

/// A registered user, without credentials
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub api_keys: Vec<ApiKey>,
    pub creation_time: DateTime<Utc>,
}

impl User {
    /// First stored key for a transcription model
    pub fn api_key_for(&self, model: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|key| key.model == model)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub api_keys: String,
    pub creation_time: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> User {
        let api_keys = serde_json::from_str(&self.api_keys).unwrap_or_else(|e| {
            tracing::warn!(user_id = %self.id, "Invalid api_keys column, ignoring: {}", e);
            Vec::new()
        });

        User {
            id: self.id,
            email: self.email,
            username: self.username,
            api_keys,
            creation_time: self.creation_time,
        }
    }
}

/// An analysis session: a named collection of files with a workspace layout
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub creation_time: DateTime<Utc>,
    pub modified_time: DateTime<Utc>,
}

/// Metadata of an uploaded audio file (the audio itself is fetched separately)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub creation_time: DateTime<Utc>,
    pub modified_time: DateTime<Utc>,
    pub uploader: Option<String>,
    pub session: String,
    pub ephemeral: bool,
    pub ground_truth: Option<String>,
    /// Size of the audio data, in bytes
    pub size: i64,
}

/// A login session
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthSession {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
