use anyhow::Result;
use face_auth_helpers::{
    connect, create_face_auth_log, get_or_create_participant, get_or_create_space,
    get_organization_app, HelperError, NewFaceAuthLog,
};
use sqlx::AnyConnection;

const SCHEMA: &[&str] = &[
    "CREATE TABLE organization_apps (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uuid TEXT NOT NULL UNIQUE,
        organization_id INTEGER NOT NULL,
        name TEXT NOT NULL
    )",
    "CREATE TABLE spaces (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        organization_id INTEGER NOT NULL,
        space_code TEXT NOT NULL,
        space_name TEXT NOT NULL,
        open_result_days INTEGER NOT NULL DEFAULT 7,
        UNIQUE (organization_id, space_code)
    )",
    "CREATE TABLE participants (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uuid TEXT NOT NULL UNIQUE,
        organization_id INTEGER NOT NULL,
        space_id INTEGER NOT NULL REFERENCES spaces (id),
        participant_code TEXT NOT NULL,
        participant_user_code TEXT NOT NULL,
        participant_name TEXT NOT NULL,
        result_closed_at TEXT NOT NULL,
        UNIQUE (organization_id, space_id, participant_code)
    )",
    "CREATE TABLE face_auth_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        authentication_code TEXT NOT NULL UNIQUE,
        organization_id INTEGER NOT NULL,
        space_id INTEGER NOT NULL,
        participant_id INTEGER NOT NULL REFERENCES participants (id),
        is_authenticated BOOLEAN NOT NULL,
        reason TEXT NOT NULL,
        logs TEXT NOT NULL,
        threshold REAL NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
];

async fn setup_database() -> Result<AnyConnection> {
    let mut conn = connect("sqlite::memory:").await?;
    for ddl in SCHEMA {
        sqlx::query(*ddl).execute(&mut conn).await?;
    }
    sqlx::query(
        "INSERT INTO organization_apps (uuid, organization_id, name) \
         VALUES ('0f8fad5bd9cb469fa16570867728950e', 10, 'Acme Exams')",
    )
    .execute(&mut conn)
    .await?;
    Ok(conn)
}

async fn count(conn: &mut AnyConnection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    let rows: i64 = sqlx::query_scalar(&sql).fetch_one(conn).await?;
    Ok(rows)
}

fn attempt(participant_id: i64, space_id: i64, code: &str, ok: bool) -> NewFaceAuthLog {
    NewFaceAuthLog {
        authentication_code: code.to_string(),
        organization_id: 10,
        space_id,
        participant_id,
        is_authenticated: ok,
        reason: serde_json::json!({"match": ok, "score": 0.91}),
        logs: serde_json::json!([{"step": "detect", "faces": 1}]),
        threshold: 0.8,
    }
}

#[tokio::test]
async fn test_organization_app_found_with_or_without_hyphens() -> Result<()> {
    let mut conn = setup_database().await?;

    let hyphenated = get_organization_app(&mut conn, "0f8fad5b-d9cb-469f-a165-70867728950e")
        .await?
        .expect("app should exist");
    assert_eq!(hyphenated.organization_id, 10);
    assert_eq!(hyphenated.name, "Acme Exams");

    let compact = get_organization_app(&mut conn, "0f8fad5bd9cb469fa16570867728950e").await?;
    assert_eq!(compact, Some(hyphenated));
    Ok(())
}

#[tokio::test]
async fn test_unknown_organization_app_is_none() -> Result<()> {
    let mut conn = setup_database().await?;

    let app = get_organization_app(&mut conn, "7c9e6679-7425-40de-944b-e07fc1f90ae7").await?;
    assert!(app.is_none());
    Ok(())
}

#[tokio::test]
async fn test_get_or_create_space_is_idempotent() -> Result<()> {
    let mut conn = setup_database().await?;

    let created = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;
    assert_eq!(created.organization_id, 10);
    assert_eq!(created.space_code, "room-a");
    assert_eq!(created.space_name, "Room A");
    assert_eq!(created.open_result_days, 7);

    let fetched = get_or_create_space(&mut conn, 10, "room-a", "Renamed").await?;
    assert_eq!(fetched, created);
    assert_eq!(count(&mut conn, "spaces").await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_space_code_is_scoped_by_organization() -> Result<()> {
    let mut conn = setup_database().await?;

    let first = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;
    let second = get_or_create_space(&mut conn, 11, "room-a", "Room A").await?;
    assert_ne!(first.id, second.id);
    assert_eq!(count(&mut conn, "spaces").await?, 2);
    Ok(())
}

#[tokio::test]
async fn test_get_or_create_participant_is_idempotent() -> Result<()> {
    let mut conn = setup_database().await?;
    let space = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;

    let created =
        get_or_create_participant(&mut conn, 10, &space, "p-001", "user-001", "Alice").await?;
    assert_eq!(created.space_id, space.id);
    assert_eq!(created.participant_code, "p-001");
    assert_eq!(created.participant_user_code, "user-001");
    assert_eq!(created.participant_name, "Alice");
    assert_eq!(created.uuid.len(), 32);
    assert!(created.uuid.chars().all(|c| c.is_ascii_hexdigit()));

    let fetched =
        get_or_create_participant(&mut conn, 10, &space, "p-001", "other", "Someone Else").await?;
    assert_eq!(fetched, created);
    assert_eq!(count(&mut conn, "participants").await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_new_participant_result_window_follows_space() -> Result<()> {
    let mut conn = setup_database().await?;
    let space = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;

    // Stored timestamps keep microseconds only.
    let before = chrono::Local::now().naive_local() - chrono::Duration::milliseconds(1);
    let participant =
        get_or_create_participant(&mut conn, 10, &space, "p-001", "user-001", "Alice").await?;
    let after = chrono::Local::now().naive_local();

    let closes_at = participant.closes_at().expect("timestamp should parse");
    assert!(Some(closes_at) >= space.result_closed_at(before));
    assert!(Some(closes_at) <= space.result_closed_at(after));
    Ok(())
}

#[tokio::test]
async fn test_same_participant_code_in_two_spaces() -> Result<()> {
    let mut conn = setup_database().await?;
    let room_a = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;
    let room_b = get_or_create_space(&mut conn, 10, "room-b", "Room B").await?;

    let in_a = get_or_create_participant(&mut conn, 10, &room_a, "p-001", "u", "Alice").await?;
    let in_b = get_or_create_participant(&mut conn, 10, &room_b, "p-001", "u", "Alice").await?;
    assert_ne!(in_a.id, in_b.id);
    assert_ne!(in_a.uuid, in_b.uuid);
    Ok(())
}

#[tokio::test]
async fn test_face_auth_logs_get_distinct_ids() -> Result<()> {
    let mut conn = setup_database().await?;
    let space = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;
    let participant =
        get_or_create_participant(&mut conn, 10, &space, "p-001", "user-001", "Alice").await?;

    let first = create_face_auth_log(&mut conn, &attempt(participant.id, space.id, "auth-1", true))
        .await?;
    let second =
        create_face_auth_log(&mut conn, &attempt(participant.id, space.id, "auth-2", false))
            .await?;
    assert_ne!(first, second);
    assert_eq!(count(&mut conn, "face_auth_logs").await?, 2);
    Ok(())
}

#[tokio::test]
async fn test_face_auth_log_stores_json_payloads() -> Result<()> {
    let mut conn = setup_database().await?;
    let space = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;
    let participant =
        get_or_create_participant(&mut conn, 10, &space, "p-001", "user-001", "Alice").await?;

    let log = attempt(participant.id, space.id, "auth-7", true);
    let id = create_face_auth_log(&mut conn, &log).await?;

    let (reason, logs): (String, String) =
        sqlx::query_as("SELECT reason, logs FROM face_auth_logs WHERE id = ?")
            .bind(id)
            .fetch_one(&mut conn)
            .await?;
    assert_eq!(serde_json::from_str::<serde_json::Value>(&reason)?, log.reason);
    assert_eq!(serde_json::from_str::<serde_json::Value>(&logs)?, log.logs);
    Ok(())
}

#[tokio::test]
async fn test_missing_table_surfaces_as_database_error() -> Result<()> {
    let mut conn = setup_database().await?;
    sqlx::query("DROP TABLE spaces").execute(&mut conn).await?;

    let err = get_or_create_space(&mut conn, 10, "room-a", "Room A")
        .await
        .unwrap_err();
    assert!(matches!(err, HelperError::Database(_)));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_authentication_code_is_database_error() -> Result<()> {
    let mut conn = setup_database().await?;
    let space = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;
    let participant =
        get_or_create_participant(&mut conn, 10, &space, "p-001", "user-001", "Alice").await?;

    create_face_auth_log(&mut conn, &attempt(participant.id, space.id, "auth-1", true)).await?;
    let err = create_face_auth_log(&mut conn, &attempt(participant.id, space.id, "auth-1", false))
        .await
        .unwrap_err();

    match err {
        HelperError::Database(sqlx::Error::Database(db_err)) => {
            assert!(db_err.is_unique_violation())
        }
        other => panic!("expected a unique violation, got {:?}", other),
    }
    assert_eq!(count(&mut conn, "face_auth_logs").await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_log_for_unknown_participant_is_database_error() -> Result<()> {
    let mut conn = setup_database().await?;
    let space = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;

    let err = create_face_auth_log(&mut conn, &attempt(999, space.id, "auth-1", true))
        .await
        .unwrap_err();

    match err {
        HelperError::Database(sqlx::Error::Database(db_err)) => {
            assert!(db_err.is_foreign_key_violation())
        }
        other => panic!("expected a foreign key violation, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_result_window_is_rejected() -> Result<()> {
    let mut conn = setup_database().await?;
    let mut space = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;
    sqlx::query("UPDATE spaces SET open_result_days = 200000000 WHERE id = ?")
        .bind(space.id)
        .execute(&mut conn)
        .await?;
    space = get_or_create_space(&mut conn, 10, "room-a", "Room A").await?;

    let err = get_or_create_participant(&mut conn, 10, &space, "p-001", "user-001", "Alice")
        .await
        .unwrap_err();

    match err {
        HelperError::InvalidRecord { table, id, .. } => {
            assert_eq!(table, "spaces");
            assert_eq!(id, space.id);
        }
        other => panic!("expected an invalid space row, got {:?}", other),
    }
    assert_eq!(count(&mut conn, "participants").await?, 0);
    Ok(())
}
