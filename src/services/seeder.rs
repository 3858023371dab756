use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::TenantConfig;
use crate::error::ServiceError;
use crate::firestore::{DocumentStore, FieldValue, SESSIONS, TENANT_FIELD, USERS, WORKOUT_LOGS};
use crate::models::{
    ContractType, Exercise, Member, Session, SessionStatus, SessionType, WorkoutLog, WorkoutSet, CARDIO_MARKER,
};

/// (name, email, phone)
pub const MEMBER_PROFILES: [(&str, &str, &str); 10] = [
    ("山田太郎", "yamada.taro@example.com", "090-1234-5678"),
    ("佐藤花子", "sato.hanako@example.com", "090-2345-6789"),
    ("鈴木一郎", "suzuki.ichiro@example.com", "080-3456-7890"),
    ("田中美咲", "tanaka.misaki@example.com", "080-4567-8901"),
    ("高橋健太", "takahashi.kenta@example.com", "090-5678-9012"),
    ("渡辺由美", "watanabe.yumi@example.com", "080-6789-0123"),
    ("伊藤大輔", "ito.daisuke@example.com", "090-7890-1234"),
    ("中村麻衣", "nakamura.mai@example.com", "080-8901-2345"),
    ("小林修平", "kobayashi.shuhei@example.com", "090-9012-3456"),
    ("加藤愛", "kato.ai@example.com", "080-0123-4567"),
];

/// Tier by profile position: 3 premium, 4 standard, 3 basic
pub const CONTRACT_TIERS: [ContractType; 10] = [
    ContractType::Premium,
    ContractType::Premium,
    ContractType::Premium,
    ContractType::Standard,
    ContractType::Standard,
    ContractType::Standard,
    ContractType::Standard,
    ContractType::Basic,
    ContractType::Basic,
    ContractType::Basic,
];

pub const SESSION_COUNT: usize = 30;
pub const SESSION_DURATIONS: [u32; 4] = [30, 45, 60, 90];
pub const MAX_LOGS_PER_MEMBER: u32 = 10;
pub const CARDIO_PROBABILITY: f64 = 0.3;
pub const CARDIO_EXERCISE: &str = "ランニング";
pub const STRENGTH_SETS: usize = 3;
pub const MUSCLE_GROUPS: [&str; 6] = ["胸", "背中", "脚", "肩", "腕", "腹筋"];
pub const STRENGTH_EXERCISES: [&str; 5] = ["ベンチプレス", "スクワット", "デッドリフト", "ショルダープレス", "ラットプルダウン"];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("gym '{0}' already has members; pass --append to seed again")]
    TenantAlreadySeeded(String),

    #[error("failed to check existing data: {0}")]
    Store(#[from] ServiceError),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub members: usize,
    pub sessions: usize,
    pub workout_logs: usize,
    pub failures: usize,
}

/// Member as inserted, with its generated document id
#[derive(Debug, Clone)]
pub struct SeededMember {
    pub id: String,
    pub member: Member,
}

pub fn generate_member<R: Rng + ?Sized>(rng: &mut R, gym_id: &str, index: usize, now: DateTime<Utc>) -> Option<Member> {
    let (name, email, phone) = MEMBER_PROFILES.get(index)?;
    let contract_type = *CONTRACT_TIERS.get(index)?;

    Some(Member {
        gym_id: gym_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        contract_type,
        join_date: now - Duration::days(rng.gen_range(30..=180)),
        last_visit: now - Duration::days(rng.gen_range(0..=30)),
        total_sessions: rng.gen_range(5..=50),
        updated_at: now,
    })
}

pub fn generate_session<R: Rng + ?Sized>(
    rng: &mut R,
    gym_id: &str,
    members: &[SeededMember],
    now: DateTime<Utc>,
) -> Option<Session> {
    let member = members.choose(rng)?;
    let date = now + Duration::days(rng.gen_range(-30..=7));
    let duration_minutes = *SESSION_DURATIONS.choose(rng)?;
    let session_type = *SessionType::ALL.choose(rng)?;

    Some(Session {
        gym_id: gym_id.to_string(),
        user_id: member.id.clone(),
        user_name: member.member.name.clone(),
        date,
        duration_minutes,
        session_type,
        status: SessionStatus::at(date, now),
        updated_at: now,
    })
}

pub fn generate_workout_log<R: Rng + ?Sized>(
    rng: &mut R,
    gym_id: &str,
    member_id: &str,
    now: DateTime<Utc>,
) -> WorkoutLog {
    let date = now - Duration::days(rng.gen_range(1..=60));

    if rng.gen_bool(CARDIO_PROBABILITY) {
        // weight records minutes for cardio
        return WorkoutLog {
            gym_id: gym_id.to_string(),
            user_id: member_id.to_string(),
            date,
            muscle_group: CARDIO_MARKER.to_string(),
            exercises: vec![Exercise {
                name: CARDIO_EXERCISE.to_string(),
                sets: vec![WorkoutSet {
                    reps: 1,
                    weight: rng.gen_range(20..=60),
                }],
            }],
            notes: "有酸素運動".to_string(),
        };
    }

    let muscle_group = MUSCLE_GROUPS[rng.gen_range(0..MUSCLE_GROUPS.len())];
    let exercise = STRENGTH_EXERCISES[rng.gen_range(0..STRENGTH_EXERCISES.len())];
    let sets = (0..STRENGTH_SETS)
        .map(|_| WorkoutSet {
            reps: rng.gen_range(8..=12),
            weight: rng.gen_range(20..=100),
        })
        .collect();

    WorkoutLog {
        gym_id: gym_id.to_string(),
        user_id: member_id.to_string(),
        date,
        muscle_group: muscle_group.to_string(),
        exercises: vec![Exercise {
            name: exercise.to_string(),
            sets,
        }],
        notes: format!("{}トレーニング", muscle_group),
    }
}

/// Inserts synthetic members, sessions and workout logs for one gym
pub struct DemoSeeder<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    tenant: TenantConfig,
    allow_duplicates: bool,
}

impl<'a, S: DocumentStore + ?Sized> DemoSeeder<'a, S> {
    pub fn new(store: &'a S, tenant: TenantConfig) -> Self {
        Self {
            store,
            tenant,
            allow_duplicates: false,
        }
    }

    /// Seed even when the gym already has members
    pub fn allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    async fn ensure_unseeded(&self) -> Result<(), SeedError> {
        if self.allow_duplicates {
            return Ok(());
        }
        let existing = self
            .store
            .query_eq(USERS, TENANT_FIELD, FieldValue::from(self.tenant.gym_id.as_str()), Some(1))
            .await?;
        if !existing.is_empty() {
            return Err(SeedError::TenantAlreadySeeded(self.tenant.gym_id.clone()));
        }
        Ok(())
    }

    pub async fn seed<R: Rng + Send>(&self, rng: &mut R, now: DateTime<Utc>) -> Result<SeedReport, SeedError> {
        self.ensure_unseeded().await?;

        let mut report = SeedReport::default();
        let members = self.seed_members(rng, now, &mut report).await;
        if members.is_empty() {
            warn!(gym_id = %self.tenant.gym_id, "No members inserted, skipping sessions and workout logs");
            return Ok(report);
        }
        self.seed_sessions(rng, &members, now, &mut report).await;
        self.seed_workout_logs(rng, &members, now, &mut report).await;

        info!(
            gym_id = %self.tenant.gym_id,
            members = report.members,
            sessions = report.sessions,
            workout_logs = report.workout_logs,
            failures = report.failures,
            "Seeding finished"
        );
        Ok(report)
    }

    async fn seed_members<R: Rng + Send>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
        report: &mut SeedReport,
    ) -> Vec<SeededMember> {
        let mut seeded = Vec::new();
        for index in 0..MEMBER_PROFILES.len() {
            let Some(member) = generate_member(rng, &self.tenant.gym_id, index, now) else {
                continue;
            };
            match self.store.add(USERS, member.to_fields()).await {
                Ok(id) => {
                    info!(
                        name = %member.name,
                        contract = member.contract_type.as_str(),
                        sessions = member.total_sessions,
                        "Member added"
                    );
                    seeded.push(SeededMember { id, member });
                }
                Err(e) => {
                    error!(name = %member.name, "Failed to add member: {}", e);
                    report.failures += 1;
                }
            }
        }
        report.members = seeded.len();
        seeded
    }

    async fn seed_sessions<R: Rng + Send>(
        &self,
        rng: &mut R,
        members: &[SeededMember],
        now: DateTime<Utc>,
        report: &mut SeedReport,
    ) {
        for _ in 0..SESSION_COUNT {
            let Some(session) = generate_session(rng, &self.tenant.gym_id, members, now) else {
                continue;
            };
            match self.store.add(SESSIONS, session.to_fields()).await {
                Ok(_) => report.sessions += 1,
                Err(e) => {
                    error!(user_id = %session.user_id, "Failed to add session: {}", e);
                    report.failures += 1;
                }
            }
        }
        info!(count = report.sessions, "Sessions added");
    }

    async fn seed_workout_logs<R: Rng + Send>(
        &self,
        rng: &mut R,
        members: &[SeededMember],
        now: DateTime<Utc>,
        report: &mut SeedReport,
    ) {
        for seeded in members {
            let count = seeded.member.total_sessions.min(MAX_LOGS_PER_MEMBER);
            for _ in 0..count {
                let log = generate_workout_log(rng, &self.tenant.gym_id, &seeded.id, now);
                match self.store.add(WORKOUT_LOGS, log.to_fields()).await {
                    Ok(_) => report.workout_logs += 1,
                    Err(e) => {
                        error!(user_id = %seeded.id, "Failed to add workout log: {}", e);
                        report.failures += 1;
                    }
                }
            }
        }
        info!(count = report.workout_logs, "Workout logs added");
    }
}
