//! Database tests: users, login sessions, analysis sessions, files
//!
//! Each test opens a fresh database in its own temporary directory.

use chrono::Duration;
use serde_json::json;
use spectral_common::db::files::{self, NewFile};
use spectral_common::db::users::{self, CreateUserOutcome, NewUser};
use spectral_common::db::{admin, auth_sessions, init, init_database, seeding, sessions, ApiKey};
use spectral_common::modes::ModeName;
use spectral_common::state::{FileState, PaneState, SessionState};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("spectral.db")).await.unwrap();
    (dir, pool)
}

async fn create_user(pool: &SqlitePool, username: &str) -> String {
    let outcome = users::create_user(
        pool,
        NewUser {
            id: None,
            username,
            email: &format!("{}@example.com", username),
            password: "hunter22",
        },
    )
    .await
    .unwrap();

    match outcome {
        CreateUserOutcome::Created { user_id } => user_id,
        other => panic!("user not created: {:?}", other),
    }
}

async fn upload(pool: &SqlitePool, session: &str, uploader: &str, name: &str) -> String {
    files::upload(
        pool,
        NewFile {
            id: None,
            name,
            data: b"RIFF....WAVE",
            session,
            uploader: Some(uploader),
            ground_truth: None,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_init_database_creates_file_and_reopens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("spectral.db");

    let pool = init_database(&path).await.unwrap();
    assert!(path.exists());
    pool.close().await;

    let pool = init_database(&path).await.unwrap();
    assert_eq!(users::count_users(&pool).await.unwrap(), 0);
    assert_eq!(
        init::schema_version(&pool).await.unwrap(),
        Some(init::SCHEMA_VERSION)
    );
}

#[tokio::test]
async fn test_duplicate_email_and_username_are_reported() {
    let (_dir, pool) = setup_db().await;
    create_user(&pool, "alice").await;

    let same_email = users::create_user(
        &pool,
        NewUser {
            id: None,
            username: "other",
            email: "alice@example.com",
            password: "hunter22",
        },
    )
    .await
    .unwrap();
    assert_eq!(same_email, CreateUserOutcome::EmailInUse);

    let same_username = users::create_user(
        &pool,
        NewUser {
            id: None,
            username: "alice",
            email: "new@example.com",
            password: "hunter22",
        },
    )
    .await
    .unwrap();
    assert_eq!(same_username, CreateUserOutcome::UsernameInUse);
}

#[tokio::test]
async fn test_verify_user_checks_password() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let user = users::verify_user(&pool, "alice", "hunter22").await.unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert!(user.api_keys.is_empty());

    assert!(users::verify_user(&pool, "alice", "wrong").await.unwrap().is_none());
    assert!(users::verify_user(&pool, "nobody", "hunter22").await.unwrap().is_none());
}

#[tokio::test]
async fn test_password_stored_as_argon2id_phc_string() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    assert!(stored.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    assert!(!stored.contains("hunter22"));
}

#[tokio::test]
async fn test_api_keys_replace_by_name() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let key = |name: &str, value: &str| ApiKey {
        name: name.to_string(),
        model: "deepgram".to_string(),
        key: value.to_string(),
    };

    users::set_api_key(&pool, &user_id, key("main", "k1")).await.unwrap();
    users::set_api_key(&pool, &user_id, key("main", "k2")).await.unwrap();

    let user = users::get_user(&pool, &user_id).await.unwrap().unwrap();
    assert_eq!(user.api_keys, vec![key("main", "k2")]);
    assert_eq!(user.api_key_for("deepgram").unwrap().key, "k2");
    assert!(user.api_key_for("whisper").is_none());

    assert!(users::delete_api_key(&pool, &user_id, "main").await.unwrap());
    assert!(!users::delete_api_key(&pool, &user_id, "main").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_api_key_edits_are_all_kept() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let edits: Vec<_> = (0..8)
        .map(|i| {
            let pool = pool.clone();
            let user_id = user_id.clone();
            tokio::spawn(async move {
                let key = ApiKey {
                    name: format!("key-{}", i),
                    model: "deepgram".to_string(),
                    key: format!("secret-{}", i),
                };
                users::set_api_key(&pool, &user_id, key).await
            })
        })
        .collect();
    for edit in edits {
        edit.await.unwrap().unwrap();
    }

    let user = users::get_user(&pool, &user_id).await.unwrap().unwrap();
    assert_eq!(user.api_keys.len(), 8);
}

#[tokio::test]
async fn test_api_key_edits_for_unknown_user_fail() {
    let (_dir, pool) = setup_db().await;
    let key = ApiKey {
        name: "main".to_string(),
        model: "whisper".to_string(),
        key: "k".to_string(),
    };

    assert!(matches!(
        users::set_api_key(&pool, "ghost", key).await,
        Err(spectral_common::Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_login_sessions_expire() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let active = auth_sessions::create(&pool, &user_id, Duration::days(1)).await.unwrap();
    let user = auth_sessions::validate(&pool, &active.id).await.unwrap().unwrap();
    assert_eq!(user.username, "alice");

    let expired = auth_sessions::create(&pool, &user_id, Duration::seconds(-1)).await.unwrap();
    assert!(auth_sessions::validate(&pool, &expired.id).await.unwrap().is_none());

    auth_sessions::invalidate(&pool, &active.id).await.unwrap();
    assert!(auth_sessions::validate(&pool, &active.id).await.unwrap().is_none());
    assert!(auth_sessions::validate(&pool, "unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_session_lifetime_out_of_range_is_an_error() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let result = auth_sessions::create(&pool, &user_id, Duration::days(100_000_000)).await;
    assert!(matches!(result, Err(spectral_common::Error::Internal(_))));
    assert_eq!(auth_sessions::purge_expired(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_purge_expired_keeps_active_sessions() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let active = auth_sessions::create(&pool, &user_id, Duration::days(1)).await.unwrap();
    auth_sessions::create(&pool, &user_id, Duration::seconds(-1)).await.unwrap();
    auth_sessions::create(&pool, &user_id, Duration::seconds(-10)).await.unwrap();

    assert_eq!(auth_sessions::purge_expired(&pool).await.unwrap(), 2);
    assert!(auth_sessions::validate(&pool, &active.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_new_session_loads_default_state() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let session_id = sessions::create(&pool, "First", &user_id).await.unwrap();
    let state = sessions::load_state(&pool, &session_id).await.unwrap();
    assert_eq!(state, SessionState::default());

    assert!(sessions::get_owned(&pool, &session_id, &user_id).await.unwrap().is_some());
    assert!(sessions::get_owned(&pool, &session_id, "someone-else").await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_state_is_reset_only_for_that_session() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let mut custom = SessionState::default();
    custom.add_pane(PaneState::new("p2", "second", ModeName::Spectrogram));

    let broken = sessions::create(&pool, "Broken", &user_id).await.unwrap();
    let intact = sessions::create(&pool, "Intact", &user_id).await.unwrap();
    sessions::save_state_if_changed(&pool, &intact, &custom).await.unwrap();

    sqlx::query("UPDATE sessions SET state = ? WHERE id = ?")
        .bind(json!({"panes": "not a map"}).to_string())
        .bind(&broken)
        .execute(&pool)
        .await
        .unwrap();

    let state = sessions::load_state(&pool, &broken).await.unwrap();
    assert_eq!(state, SessionState::default());

    let stored: Option<String> = sqlx::query_scalar("SELECT state FROM sessions WHERE id = ?")
        .bind(&broken)
        .fetch_one(&pool)
        .await
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored.unwrap()).unwrap();
    assert_eq!(stored, serde_json::to_value(SessionState::default()).unwrap());

    assert_eq!(sessions::load_state(&pool, &intact).await.unwrap(), custom);
}

#[tokio::test]
async fn test_stored_pane_without_id_is_kept() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;
    let session_id = sessions::create(&pool, "Partial", &user_id).await.unwrap();

    sqlx::query("UPDATE sessions SET state = ? WHERE id = ?")
        .bind(json!({"panes": {"p1": {"title": "mine", "mode": "spectrogram"}}}).to_string())
        .bind(&session_id)
        .execute(&pool)
        .await
        .unwrap();

    let state = sessions::load_state(&pool, &session_id).await.unwrap();
    let ids: Vec<&String> = state.panes.keys().collect();
    assert_eq!(ids, vec!["p1"]);
    assert_eq!(state.panes["p1"].id, "p1");
    assert_eq!(state.panes["p1"].title, "mine");
    assert_eq!(state.panes["p1"].mode, ModeName::Spectrogram);

    let stored: Option<String> = sqlx::query_scalar("SELECT state FROM sessions WHERE id = ?")
        .bind(&session_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(stored.unwrap().contains("\"mine\""));
}

#[tokio::test]
async fn test_session_created_with_all_its_files() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let session_id = sessions::create_with_files(
        &pool,
        "Imported",
        &user_id,
        &[
            sessions::SessionFile {
                name: "one.wav",
                data: b"RIFF1",
                ground_truth: Some("hello"),
            },
            sessions::SessionFile {
                name: "two.wav",
                data: b"RIFF2",
                ground_truth: None,
            },
        ],
    )
    .await
    .unwrap();

    let stored = files::list_for_session(&pool, &session_id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|f| f.uploader.as_deref() == Some(user_id.as_str())));
    assert_eq!(sessions::get(&pool, &session_id).await.unwrap().unwrap().name, "Imported");
}

#[tokio::test]
async fn test_failed_file_leaves_no_partial_session() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    sqlx::query(
        "CREATE TRIGGER reject_bad BEFORE INSERT ON files WHEN NEW.name = 'bad.wav' \
         BEGIN SELECT RAISE(ABORT, 'rejected'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = sessions::create_with_files(
        &pool,
        "Half",
        &user_id,
        &[
            sessions::SessionFile {
                name: "good.wav",
                data: b"RIFF1",
                ground_truth: None,
            },
            sessions::SessionFile {
                name: "bad.wav",
                data: b"RIFF2",
                ground_truth: None,
            },
        ],
    )
    .await;

    assert!(result.is_err());
    assert_eq!(sessions::count_for_owner(&pool, &user_id).await.unwrap(), 0);
    assert_eq!(files::count_files(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_save_state_skips_unchanged_state() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;
    let session_id = sessions::create(&pool, "First", &user_id).await.unwrap();

    let mut state = SessionState::default();
    state.add_pane(PaneState::new("p2", "second", ModeName::Waveform));

    assert!(sessions::save_state_if_changed(&pool, &session_id, &state).await.unwrap());
    assert!(!sessions::save_state_if_changed(&pool, &session_id, &state).await.unwrap());
    assert_eq!(sessions::load_state(&pool, &session_id).await.unwrap(), state);
}

#[tokio::test]
async fn test_sessions_listed_most_recent_first() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;

    let older = sessions::create(&pool, "Older", &user_id).await.unwrap();
    let newer = sessions::create(&pool, "Newer", &user_id).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    sessions::touch(&pool, &older).await.unwrap();

    let listed: Vec<String> = sessions::list_for_owner(&pool, &user_id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed, vec![older, newer]);
    assert_eq!(sessions::count_for_owner(&pool, &user_id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_delete_session_removes_its_files() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;
    let session_id = sessions::create(&pool, "First", &user_id).await.unwrap();
    let file_id = upload(&pool, &session_id, &user_id, "one.wav").await;

    assert!(sessions::delete(&pool, &session_id).await.unwrap());
    assert!(files::get(&pool, &file_id).await.unwrap().is_none());
    assert!(!sessions::delete(&pool, &session_id).await.unwrap());
}

#[tokio::test]
async fn test_file_access_requires_uploader() {
    let (_dir, pool) = setup_db().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let session_id = sessions::create(&pool, "First", &alice).await.unwrap();
    let file_id = upload(&pool, &session_id, &alice, "one.wav").await;

    let record = files::get(&pool, &file_id).await.unwrap().unwrap();
    assert_eq!(record.size, 12);
    assert!(!record.ephemeral);

    assert_eq!(
        files::fetch_name(&pool, &file_id, &alice).await.unwrap().as_deref(),
        Some("one.wav")
    );
    assert_eq!(
        files::fetch_data(&pool, &file_id, &alice).await.unwrap().unwrap(),
        b"RIFF....WAVE".to_vec()
    );
    assert!(files::fetch_name(&pool, &file_id, &bob).await.unwrap().is_none());
    assert!(files::fetch_data(&pool, &file_id, &bob).await.unwrap().is_none());
    assert!(files::is_owned_by(&pool, &file_id, &alice).await.unwrap());
    assert!(!files::is_owned_by(&pool, &file_id, &bob).await.unwrap());

    assert!(!files::delete_owned(&pool, &file_id, &session_id, &bob).await.unwrap());
    assert!(files::delete_owned(&pool, &file_id, &session_id, &alice).await.unwrap());
    assert_eq!(files::count_for_uploader(&pool, &alice).await.unwrap(), 0);
}

#[tokio::test]
async fn test_file_delete_is_scoped_to_its_session() {
    let (_dir, pool) = setup_db().await;
    let alice = create_user(&pool, "alice").await;
    let first = sessions::create(&pool, "First", &alice).await.unwrap();
    let second = sessions::create(&pool, "Second", &alice).await.unwrap();
    let file_id = upload(&pool, &second, &alice, "one.wav").await;

    assert!(!files::delete_owned(&pool, &file_id, &first, &alice).await.unwrap());
    assert!(files::get(&pool, &file_id).await.unwrap().is_some());

    assert!(files::delete_owned(&pool, &file_id, &second, &alice).await.unwrap());
    assert!(files::get(&pool, &file_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_states_take_identity_from_row() {
    let (_dir, pool) = setup_db().await;
    let user_id = create_user(&pool, "alice").await;
    let session_id = sessions::create(&pool, "First", &user_id).await.unwrap();

    let saved = upload(&pool, &session_id, &user_id, "saved.wav").await;
    let broken = upload(&pool, &session_id, &user_id, "broken.wav").await;

    let state = FileState {
        note: Some("hello".to_string()),
        cycle_enabled: true,
        ..FileState::for_file("wrong-id", "wrong-name")
    };
    assert!(files::save_state(&pool, &saved, &user_id, &state).await.unwrap());
    assert!(!files::save_state(&pool, "missing", &user_id, &state).await.unwrap());

    sqlx::query("UPDATE files SET state = '[1, 2]', ground_truth = 'said this' WHERE id = ?")
        .bind(&broken)
        .execute(&pool)
        .await
        .unwrap();

    let states = files::load_file_states(&pool, &session_id).await.unwrap();
    let saved_state = states.iter().find(|s| s.id == saved).unwrap();
    assert_eq!(saved_state.name, "saved.wav");
    assert_eq!(saved_state.note.as_deref(), Some("hello"));
    assert!(saved_state.cycle_enabled);

    let broken_state = states.iter().find(|s| s.id == broken).unwrap();
    assert_eq!(broken_state.name, "broken.wav");
    assert_eq!(broken_state.ground_truth.as_deref(), Some("said this"));
    assert!(broken_state.note.is_none());
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let (_dir, pool) = setup_db().await;
    let samples = TempDir::new().unwrap();
    for name in seeding::SAMPLE_TORGO {
        std::fs::write(samples.path().join(format!("{}.wav", name)), b"RIFF").unwrap();
    }

    let first = seeding::seed_sample_torgo(&pool, samples.path()).await.unwrap();
    assert!(!first.is_sample_user_seeded);
    assert!(!first.is_sample_session_seeded);
    assert!(first.is_sample_torgo_seeded);

    let second = seeding::seed_sample_torgo(&pool, samples.path()).await.unwrap();
    assert!(second.is_sample_user_seeded);
    assert!(second.is_sample_session_seeded);

    let counts = admin::table_counts(&pool).await.unwrap();
    assert_eq!(counts.users, 1);
    assert_eq!(counts.sessions, 1);
    assert_eq!(counts.files, seeding::SAMPLE_TORGO.len() as i64);

    let user = users::verify_user(&pool, seeding::SAMPLE_USERNAME, seeding::SAMPLE_PASSWORD)
        .await
        .unwrap();
    assert!(user.is_some());

    let state = sessions::load_state(&pool, seeding::SAMPLE_SESSION_ID).await.unwrap();
    assert_eq!(state, seeding::sample_session_state());
}

#[tokio::test]
async fn test_seeding_torgo_requires_sample_files() {
    let (_dir, pool) = setup_db().await;
    let empty = TempDir::new().unwrap();

    assert!(seeding::seed_sample_torgo(&pool, empty.path()).await.is_err());
}

#[tokio::test]
async fn test_delete_all_data_empties_tables() {
    let (_dir, pool) = setup_db().await;
    seeding::seed_sample_session(&pool).await.unwrap();
    let user_id = create_user(&pool, "alice").await;
    auth_sessions::create(&pool, &user_id, Duration::days(1)).await.unwrap();

    admin::delete_all_data(&pool).await.unwrap();

    let counts = admin::table_counts(&pool).await.unwrap();
    assert_eq!(counts, admin::TableCounts { users: 0, sessions: 0, files: 0 });
}
