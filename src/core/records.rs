//! Get-or-create access to the face authentication schema.
//!
//! Every function borrows a connection the caller already opened and runs
//! its statements on it in order. Committing, rolling back and pooling stay
//! with the caller. The natural-key lookups are not atomic with the insert
//! that follows a miss, so two handlers racing on the same key can both try
//! to insert; the loser gets the constraint violation as `HelperError::Database`.

use crate::domain::model::{
    NewFaceAuthLog, OrganizationApp, Participant, Space, RESULT_CLOSED_AT_FORMAT,
};
use crate::utils::error::{HelperError, Result};
use sqlx::any::AnyQueryResult;
use sqlx::AnyConnection;
use uuid::Uuid;

const ORGANIZATION_APP_COLUMNS: &str = "id, uuid, organization_id, name";
const SPACE_COLUMNS: &str = "id, organization_id, space_code, space_name, open_result_days";
const PARTICIPANT_COLUMNS: &str = "id, uuid, organization_id, space_id, participant_code, \
     participant_user_code, participant_name, \
     CAST(result_closed_at AS CHAR) AS result_closed_at";

/// Looks up an organization app by UUID, with or without hyphens.
///
/// An unknown UUID is `Ok(None)`, not an error.
pub async fn get_organization_app(
    conn: &mut AnyConnection,
    uuid: &str,
) -> Result<Option<OrganizationApp>> {
    let uuid = uuid.replace('-', "");
    tracing::debug!(uuid = %uuid, "Looking up organization app");

    let sql = format!("SELECT {ORGANIZATION_APP_COLUMNS} FROM organization_apps WHERE uuid = ?");
    let app = sqlx::query_as::<_, OrganizationApp>(&sql)
        .bind(uuid.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    Ok(app)
}

/// Returns the space for `(organization_id, space_code)`, creating it on a miss.
///
/// `space_name` is only written when the row is created.
pub async fn get_or_create_space(
    conn: &mut AnyConnection,
    organization_id: i64,
    space_code: &str,
    space_name: &str,
) -> Result<Space> {
    let sql = format!(
        "SELECT {SPACE_COLUMNS} FROM spaces WHERE organization_id = ? AND space_code = ?"
    );
    let existing = sqlx::query_as::<_, Space>(&sql)
        .bind(organization_id)
        .bind(space_code)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(space) = existing {
        tracing::debug!(space_id = space.id, space_code, "Found existing space");
        return Ok(space);
    }

    let result = sqlx::query(
        "INSERT INTO spaces (organization_id, space_code, space_name) VALUES (?, ?, ?)",
    )
    .bind(organization_id)
    .bind(space_code)
    .bind(space_name)
    .execute(&mut *conn)
    .await?;
    let space_id = inserted_id(conn, &result, "spaces").await?;

    tracing::info!(space_id, organization_id, space_code, "Created space");

    let sql = format!("SELECT {SPACE_COLUMNS} FROM spaces WHERE id = ?");
    let space = sqlx::query_as::<_, Space>(&sql)
        .bind(space_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(space)
}

/// Returns the participant for `(organization_id, space.id, participant_code)`,
/// creating it on a miss.
///
/// A new participant gets a fresh 32-character hex UUID and a
/// `result_closed_at` of now plus the space's `open_result_days`.
pub async fn get_or_create_participant(
    conn: &mut AnyConnection,
    organization_id: i64,
    space: &Space,
    participant_code: &str,
    participant_user_code: &str,
    participant_name: &str,
) -> Result<Participant> {
    let sql = format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants \
         WHERE organization_id = ? AND space_id = ? AND participant_code = ?"
    );
    let existing = sqlx::query_as::<_, Participant>(&sql)
        .bind(organization_id)
        .bind(space.id)
        .bind(participant_code)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(participant) = existing {
        tracing::debug!(
            participant_id = participant.id,
            space_id = space.id,
            "Found existing participant"
        );
        return Ok(participant);
    }

    let result_closed_at = space
        .result_closed_at(chrono::Local::now().naive_local())
        .ok_or_else(|| HelperError::InvalidRecord {
            table: "spaces".to_string(),
            id: space.id,
            reason: format!(
                "open_result_days {} puts result_closed_at out of range",
                space.open_result_days
            ),
        })?
        .format(RESULT_CLOSED_AT_FORMAT)
        .to_string();
    let participant_uuid =
        unused_participant_uuid(conn, || Uuid::new_v4().simple().to_string()).await?;

    let result = sqlx::query(
        "INSERT INTO participants (uuid, organization_id, space_id, participant_code, \
         participant_user_code, participant_name, result_closed_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(participant_uuid.as_str())
    .bind(organization_id)
    .bind(space.id)
    .bind(participant_code)
    .bind(participant_user_code)
    .bind(participant_name)
    .bind(result_closed_at.as_str())
    .execute(&mut *conn)
    .await?;
    let participant_id = inserted_id(conn, &result, "participants").await?;

    tracing::info!(
        participant_id,
        space_id = space.id,
        uuid = %participant_uuid,
        "Created participant"
    );

    let sql = format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ?");
    let participant = sqlx::query_as::<_, Participant>(&sql)
        .bind(participant_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(participant)
}

/// Appends one face authentication attempt and returns its id.
pub async fn create_face_auth_log(conn: &mut AnyConnection, log: &NewFaceAuthLog) -> Result<i64> {
    let reason = serde_json::to_string(&log.reason)?;
    let logs = serde_json::to_string(&log.logs)?;

    let result = sqlx::query(
        "INSERT INTO face_auth_logs (authentication_code, organization_id, space_id, \
         participant_id, is_authenticated, reason, logs, threshold) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(log.authentication_code.as_str())
    .bind(log.organization_id)
    .bind(log.space_id)
    .bind(log.participant_id)
    .bind(log.is_authenticated)
    .bind(reason)
    .bind(logs)
    .bind(log.threshold)
    .execute(&mut *conn)
    .await?;
    let log_id = inserted_id(conn, &result, "face_auth_logs").await?;

    tracing::info!(
        log_id,
        participant_id = log.participant_id,
        is_authenticated = log.is_authenticated,
        "Recorded face auth attempt"
    );

    Ok(log_id)
}

/// Draws candidates from `next_uuid` until one is not used by any participant.
async fn unused_participant_uuid<F>(conn: &mut AnyConnection, mut next_uuid: F) -> Result<String>
where
    F: FnMut() -> String,
{
    loop {
        let candidate = next_uuid();
        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM participants WHERE uuid = ?")
            .bind(candidate.as_str())
            .fetch_optional(&mut *conn)
            .await?;

        match taken {
            None => return Ok(candidate),
            Some(_) => tracing::warn!(uuid = %candidate, "Participant uuid collision, regenerating"),
        }
    }
}

/// Id generated by the insert behind `result`.
///
/// The MySQL driver reports it on the result; SQLite's `Any` adapter does not,
/// so it is read back on the same connection.
async fn inserted_id(
    conn: &mut AnyConnection,
    result: &AnyQueryResult,
    table: &str,
) -> Result<i64> {
    if let Some(id) = result.last_insert_id() {
        return Ok(id);
    }

    let sql = match conn.backend_name() {
        "SQLite" => "SELECT last_insert_rowid()",
        "MySQL" => "SELECT CAST(LAST_INSERT_ID() AS SIGNED)",
        _ => {
            return Err(HelperError::MissingInsertId {
                table: table.to_string(),
            })
        }
    };
    let id: i64 = sqlx::query_scalar(sql).fetch_one(&mut *conn).await?;
    Ok(id)
}
