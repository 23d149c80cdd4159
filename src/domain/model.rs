use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Format used for `participants.result_closed_at`, both when written and read back.
pub const RESULT_CLOSED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrganizationApp {
    pub id: i64,
    pub uuid: String,
    pub organization_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Space {
    pub id: i64,
    pub organization_id: i64,
    pub space_code: String,
    pub space_name: String,
    pub open_result_days: i64,
}

impl Space {
    /// When results close for a participant who joins this space at `joined_at`.
    ///
    /// `None` when `open_result_days` pushes the date outside chrono's range.
    pub fn result_closed_at(&self, joined_at: NaiveDateTime) -> Option<NaiveDateTime> {
        TimeDelta::try_days(self.open_result_days)
            .and_then(|window| joined_at.checked_add_signed(window))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Participant {
    pub id: i64,
    pub uuid: String,
    pub organization_id: i64,
    pub space_id: i64,
    pub participant_code: String,
    pub participant_user_code: String,
    pub participant_name: String,
    /// Raw column text; see [`Participant::closes_at`].
    pub result_closed_at: String,
}

impl Participant {
    pub fn closes_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.result_closed_at, RESULT_CLOSED_AT_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&self.result_closed_at, "%Y-%m-%d %H:%M:%S"))
            .ok()
    }
}

/// One face authentication attempt, ready to be appended to `face_auth_logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFaceAuthLog {
    pub authentication_code: String,
    pub organization_id: i64,
    pub space_id: i64,
    pub participant_id: i64,
    pub is_authenticated: bool,
    pub reason: serde_json::Value,
    pub logs: serde_json::Value,
    pub threshold: f64,
}
