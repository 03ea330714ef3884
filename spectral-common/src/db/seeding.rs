//! Sample data for demonstrations and end-to-end tests
//!
//! Each step seeds its prerequisites first and is a no-op when its data
//! already exists.

use super::files::{self, NewFile};
use super::sessions;
use super::users::{self, CreateUserOutcome, NewUser};
use crate::modes::ModeName;
use crate::state::{FileState, PaneState, SessionState};
use crate::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

pub const SAMPLE_USER_ID: &str = "sample-user";
pub const SAMPLE_USERNAME: &str = "Sample";
pub const SAMPLE_EMAIL: &str = "sample@example.com";
pub const SAMPLE_PASSWORD: &str = "password";

pub const SAMPLE_SESSION_ID: &str = "sample-session";
const SAMPLE_SESSION_NAME: &str = "Sample Session";
const SAMPLE_PANE_ID: &str = "sample-session-id";

const SAMPLE_GROUND_TRUTH: &str = "the quick brown fox jumps over the lazy dog";

/// Recordings from the TORGO dataset shipped with the samples
pub const SAMPLE_TORGO: [&str; 7] = [
    "F01_severe_head_sentence1",
    "F03_moderate_head_sentence1",
    "FC03_control_head_sentence1",
    "M02_severe_head_sentence1",
    "M03_mild_head_sentence1",
    "M04_severe_head_sentence1",
    "MC02_control_head_sentence1",
];

/// Which seeding steps found their data already present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub is_sample_user_seeded: bool,
    pub is_sample_session_seeded: bool,
    pub is_sample_torgo_seeded: bool,
}

pub async fn seed_sample_user(pool: &SqlitePool) -> Result<SeedReport> {
    if users::get_user(pool, SAMPLE_USER_ID).await?.is_some() {
        return Ok(SeedReport {
            is_sample_user_seeded: true,
            ..SeedReport::default()
        });
    }

    let outcome = users::create_user(
        pool,
        NewUser {
            id: Some(SAMPLE_USER_ID),
            username: SAMPLE_USERNAME,
            email: SAMPLE_EMAIL,
            password: SAMPLE_PASSWORD,
        },
    )
    .await?;

    if outcome != (CreateUserOutcome::Created { user_id: SAMPLE_USER_ID.to_string() }) {
        return Err(Error::Internal(format!(
            "cannot seed sample user: {:?}",
            outcome
        )));
    }

    info!("Seeded sample user");
    Ok(SeedReport::default())
}

/// Workspace of the sample session: one waveform pane with two recordings
pub fn sample_session_state() -> SessionState {
    let sample_file = |name: &str, cycle_enabled: bool| FileState {
        cycle_enabled,
        ground_truth: Some(SAMPLE_GROUND_TRUTH.to_string()),
        note: Some("from Torgo dataset".to_string()),
        ..FileState::for_file(name, name)
    };

    let mut pane = PaneState::new(SAMPLE_PANE_ID, "sample", ModeName::Waveform);
    pane.files = vec![
        sample_file(SAMPLE_TORGO[0], false),
        sample_file(SAMPLE_TORGO[1], true),
    ];

    let mut state = SessionState { panes: Default::default() };
    state.add_pane(pane);
    state
}

pub async fn seed_sample_session(pool: &SqlitePool) -> Result<SeedReport> {
    let mut report = seed_sample_user(pool).await?;

    if sessions::get(pool, SAMPLE_SESSION_ID).await?.is_some() {
        report.is_sample_session_seeded = true;
        return Ok(report);
    }

    sessions::create_with_id(
        pool,
        SAMPLE_SESSION_ID,
        SAMPLE_SESSION_NAME,
        SAMPLE_USER_ID,
        Some(&sample_session_state()),
    )
    .await?;

    info!("Seeded sample session");
    Ok(report)
}

/// Seed the sample recordings, read from `<samples_dir>/<name>.wav`
pub async fn seed_sample_torgo(pool: &SqlitePool, samples_dir: &Path) -> Result<SeedReport> {
    let mut report = seed_sample_session(pool).await?;

    for name in SAMPLE_TORGO {
        if files::get(pool, name).await?.is_some() {
            continue;
        }

        let path = samples_dir.join(format!("{}.wav", name));
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::NotFound(format!("{}: {}", path.display(), e)))?;

        files::upload(
            pool,
            NewFile {
                id: Some(name),
                name,
                data: &data,
                session: SAMPLE_SESSION_ID,
                uploader: Some(SAMPLE_USER_ID),
                ground_truth: Some(SAMPLE_GROUND_TRUTH),
            },
        )
        .await?;
    }

    info!("Seeded sample recordings");
    report.is_sample_torgo_seeded = true;
    Ok(report)
}
