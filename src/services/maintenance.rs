//! One-off data fixes for the manager app's session and PT password features.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ServiceError;
use crate::firestore::{DocumentStore, FieldValue, Fields, StoredDocument, GYMS, SESSIONS, USERS};

pub const DEFAULT_PT_PASSWORD: &str = "pt2024";

#[derive(Debug, Clone, Serialize)]
pub struct SharedSession {
    pub id: String,
    pub member_email: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub has_workout_log: bool,
    pub exercise_count: usize,
}

impl SharedSession {
    fn from_document(doc: &StoredDocument) -> Self {
        let workout_log = doc.get("workoutLog").and_then(FieldValue::as_map);
        let exercise_count = workout_log
            .and_then(|log| log.get("exercises"))
            .and_then(FieldValue::as_array)
            .map(<[FieldValue]>::len)
            .unwrap_or(0);

        Self {
            id: doc.id.clone(),
            member_email: doc
                .str_field("memberEmail")
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            date: doc.get("date").and_then(FieldValue::as_timestamp),
            has_workout_log: workout_log.is_some(),
            exercise_count,
        }
    }
}

/// Sessions the trainer has shared with the member
pub async fn shared_sessions<S: DocumentStore + ?Sized>(
    store: &S,
    limit: u32,
) -> Result<Vec<SharedSession>, ServiceError> {
    let docs = store
        .query_eq(SESSIONS, "sharedWithMember", FieldValue::Bool(true), Some(limit))
        .await?;
    Ok(docs.iter().map(SharedSession::from_document).collect())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Backfill {
    Updated(String),
    Skipped(&'static str),
}

/// Copy the member's email onto every session that lacks `memberEmail`
pub async fn backfill_member_emails<S: DocumentStore + ?Sized>(store: &S) -> Result<BackfillReport, ServiceError> {
    let sessions = store.list(SESSIONS).await?;
    let mut report = BackfillReport {
        total: sessions.len(),
        ..Default::default()
    };

    for session in &sessions {
        match backfill_one(store, session).await {
            Ok(Backfill::Updated(email)) => {
                info!(session = %session.id, email = %email, "memberEmail added");
                report.updated += 1;
            }
            Ok(Backfill::Skipped(reason)) => {
                if reason != "already set" {
                    warn!(session = %session.id, "Skipped: {}", reason);
                }
                report.skipped += 1;
            }
            Err(e) => {
                error!(session = %session.id, "Update failed: {}", e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

async fn backfill_one<S: DocumentStore + ?Sized>(store: &S, session: &StoredDocument) -> Result<Backfill, ServiceError> {
    if session.str_field("memberEmail").is_some_and(|e| !e.is_empty()) {
        return Ok(Backfill::Skipped("already set"));
    }

    let member_id = session
        .str_field("userId")
        .or_else(|| session.str_field("memberId"))
        .filter(|id| !id.is_empty());
    let Some(member_id) = member_id else {
        return Ok(Backfill::Skipped("no userId"));
    };

    let Some(member) = store.get(USERS, member_id).await? else {
        return Ok(Backfill::Skipped("member not found"));
    };
    let Some(email) = member.str_field("email").filter(|e| !e.is_empty()) else {
        return Ok(Backfill::Skipped("member has no email"));
    };

    let mut fields = Fields::new();
    fields.insert("memberEmail".into(), email.into());
    store.update_fields(SESSIONS, &session.id, fields).await?;
    Ok(Backfill::Updated(email.to_string()))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PtPasswordReport {
    pub gyms_updated: usize,
    pub users_updated: usize,
    pub failed: usize,
}

/// Give every gym a shared personal-training password and point every user at it
pub async fn apply_pt_password_defaults<S: DocumentStore + ?Sized>(
    store: &S,
    common_password: &str,
) -> Result<PtPasswordReport, ServiceError> {
    let mut report = PtPasswordReport::default();

    let gyms = store.list(GYMS).await?;
    info!(count = gyms.len(), "Gyms found");
    for gym in &gyms {
        let mut fields = Fields::new();
        fields.insert("personalTrainingCommonPassword".into(), common_password.into());
        fields.insert("ptPasswordType".into(), "common".into());
        match store.update_fields(GYMS, &gym.id, fields).await {
            Ok(()) => report.gyms_updated += 1,
            Err(e) => {
                error!(gym = %gym.id, "Update failed: {}", e);
                report.failed += 1;
            }
        }
    }

    let users = store.list(USERS).await?;
    info!(count = users.len(), "Users found");
    for user in &users {
        let mut fields = Fields::new();
        fields.insert("useGymCommonPassword".into(), true.into());
        match store.update_fields(USERS, &user.id, fields).await {
            Ok(()) => report.users_updated += 1,
            Err(e) => {
                error!(user = %user.id, "Update failed: {}", e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
