//! Whole-database maintenance

use super::{files, sessions, users};
use crate::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

/// Row counts of the main tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub users: i64,
    pub sessions: i64,
    pub files: i64,
}

pub async fn table_counts(pool: &SqlitePool) -> Result<TableCounts> {
    Ok(TableCounts {
        users: users::count_users(pool).await?,
        sessions: sessions::count_sessions(pool).await?,
        files: files::count_files(pool).await?,
    })
}

/// Delete all users, sessions and files
pub async fn delete_all_data(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    for table in ["files", "sessions", "user_sessions", "users"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    warn!("Deleted all data");
    Ok(())
}
