//! Authentication account administration.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
pub use client::IdentityToolkitClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Manager,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }
}

/// Role metadata attached to an account, read by the manager app's authorization checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleClaims {
    pub gym_id: String,
    pub gym_name: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub email_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Result of an account creation attempt
#[derive(Debug)]
pub enum CreateOutcome {
    Created { uid: String },
    /// An account with this email already exists
    Conflict,
    Failed(ServiceError),
}

impl From<Result<String, ServiceError>> for CreateOutcome {
    fn from(result: Result<String, ServiceError>) -> Self {
        match result {
            Ok(uid) => CreateOutcome::Created { uid },
            Err(e) if e.is_conflict() => CreateOutcome::Conflict,
            Err(e) => CreateOutcome::Failed(e),
        }
    }
}

#[async_trait]
pub trait AuthAdmin: Send + Sync {
    async fn create_account(&self, account: &NewAccount) -> CreateOutcome;

    /// Replace the account's custom claims
    async fn set_role_claims(&self, uid: &str, claims: &RoleClaims) -> Result<(), ServiceError>;

    async fn get_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>, ServiceError>;
}
