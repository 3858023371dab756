use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::firestore::{FieldValue, Fields, TENANT_FIELD};

/// A member counts as active when they visited within this many days
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Basic,
    Standard,
    Premium,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Basic => "basic",
            ContractType::Standard => "standard",
            ContractType::Premium => "premium",
        }
    }
}

/// Gym member stored in `users`
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub gym_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub contract_type: ContractType,
    pub join_date: DateTime<Utc>,
    pub last_visit: DateTime<Utc>,
    pub total_sessions: u32,
    /// Creation instant; `isActive` is evaluated against it
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now - self.last_visit <= Duration::days(ACTIVE_WINDOW_DAYS)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(self.updated_at)
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(TENANT_FIELD.into(), self.gym_id.as_str().into());
        fields.insert("name".into(), self.name.as_str().into());
        fields.insert("email".into(), self.email.as_str().into());
        fields.insert("phone".into(), self.phone.as_str().into());
        fields.insert("contractType".into(), self.contract_type.as_str().into());
        fields.insert("isActive".into(), self.is_active().into());
        fields.insert("joinDate".into(), self.join_date.into());
        fields.insert("lastVisit".into(), self.last_visit.into());
        fields.insert("totalSessions".into(), FieldValue::from(self.total_sessions));
        fields.insert("createdAt".into(), self.join_date.into());
        fields.insert("updatedAt".into(), self.updated_at.into());
        fields
    }
}
