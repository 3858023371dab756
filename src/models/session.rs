use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::firestore::{FieldValue, Fields, TENANT_FIELD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Personal,
    Group,
    Trial,
}

impl SessionType {
    pub const ALL: [SessionType; 3] = [SessionType::Personal, SessionType::Group, SessionType::Trial];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Personal => "personal",
            SessionType::Group => "group",
            SessionType::Trial => "trial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Completed,
    Scheduled,
}

impl SessionStatus {
    /// Past (or current) sessions are completed, future ones scheduled
    pub fn at(date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if date <= now {
            SessionStatus::Completed
        } else {
            SessionStatus::Scheduled
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Completed => "completed",
            SessionStatus::Scheduled => "scheduled",
        }
    }
}

/// Training session stored in `sessions`
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub gym_id: String,
    pub user_id: String,
    pub user_name: String,
    pub date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(TENANT_FIELD.into(), self.gym_id.as_str().into());
        fields.insert("userId".into(), self.user_id.as_str().into());
        fields.insert("userName".into(), self.user_name.as_str().into());
        fields.insert("date".into(), self.date.into());
        fields.insert("duration".into(), FieldValue::from(self.duration_minutes));
        fields.insert("type".into(), self.session_type.as_str().into());
        fields.insert("status".into(), self.status.as_str().into());
        fields.insert("createdAt".into(), (self.date - Duration::days(1)).into());
        fields.insert("updatedAt".into(), self.updated_at.into());
        fields
    }
}
