use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::TenantConfig;
use crate::error::ServiceError;
use crate::identity::{AuthAdmin, CreateOutcome, NewAccount, Role, RoleClaims};

pub const DEMO_PASSWORD: &str = "GymMatch2024!";

/// Login the manager app is demoed with
#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    pub email: &'static str,
    pub display_name: &'static str,
    pub role: Role,
}

pub const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        email: "owner@gymmatch.com",
        display_name: "オーナー太郎",
        role: Role::Owner,
    },
    DemoAccount {
        email: "manager@gymmatch.com",
        display_name: "マネージャー花子",
        role: Role::Manager,
    },
    DemoAccount {
        email: "test@gymmatch.com",
        display_name: "テストユーザー",
        role: Role::Staff,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionStatus {
    Created,
    /// Account existed; claims overwritten
    Updated,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub uid: Option<String>,
    pub role: Role,
    pub gym_name: String,
    pub status: ProvisionStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionReport {
    pub accounts: Vec<ProvisionedAccount>,
}

impl ProvisionReport {
    pub fn count(&self, status: ProvisionStatus) -> usize {
        self.accounts.iter().filter(|a| a.status == status).count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("account {0} reported as existing but lookup found nothing")]
    LookupMissing(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Creates the demo logins, or refreshes their role claims when they already exist
pub struct AccountProvisioner<'a, A: AuthAdmin + ?Sized> {
    auth: &'a A,
    tenant: TenantConfig,
    password: String,
}

impl<'a, A: AuthAdmin + ?Sized> AccountProvisioner<'a, A> {
    pub fn new(auth: &'a A, tenant: TenantConfig) -> Self {
        Self {
            auth,
            tenant,
            password: DEMO_PASSWORD.to_string(),
        }
    }

    fn claims_for(&self, role: Role) -> RoleClaims {
        RoleClaims {
            gym_id: self.tenant.gym_id.clone(),
            gym_name: self.tenant.gym_name.clone(),
            role,
        }
    }

    pub async fn provision(&self, accounts: &[DemoAccount]) -> ProvisionReport {
        let mut report = ProvisionReport::default();
        for account in accounts {
            report.accounts.push(self.provision_one(account).await);
        }
        report
    }

    async fn provision_one(&self, account: &DemoAccount) -> ProvisionedAccount {
        let claims = self.claims_for(account.role);
        let mut result = ProvisionedAccount {
            email: account.email.to_string(),
            password: self.password.clone(),
            display_name: account.display_name.to_string(),
            uid: None,
            role: account.role,
            gym_name: self.tenant.gym_name.clone(),
            status: ProvisionStatus::Failed,
            error: None,
        };

        let request = NewAccount {
            email: account.email.to_string(),
            password: self.password.clone(),
            display_name: account.display_name.to_string(),
            email_verified: true,
        };

        match self.auth.create_account(&request).await {
            CreateOutcome::Created { uid } => {
                info!(email = account.email, uid = %uid, "Account created");
                result.uid = Some(uid.clone());
                match self.auth.set_role_claims(&uid, &claims).await {
                    Ok(()) => {
                        info!(email = account.email, role = account.role.as_str(), "Role claims set");
                        result.status = ProvisionStatus::Created;
                    }
                    Err(e) => {
                        error!(email = account.email, "Failed to set role claims: {}", e);
                        result.error = Some(e.to_string());
                    }
                }
            }
            CreateOutcome::Conflict => {
                warn!(email = account.email, "Account already exists, updating role claims");
                match self.update_existing(account.email, &claims).await {
                    Ok((uid, display_name)) => {
                        result.uid = Some(uid);
                        if let Some(name) = display_name {
                            result.display_name = name;
                        }
                        result.status = ProvisionStatus::Updated;
                    }
                    Err(e) => {
                        error!(email = account.email, "Failed to update existing account: {}", e);
                        result.error = Some(e.to_string());
                    }
                }
            }
            CreateOutcome::Failed(e) => {
                error!(email = account.email, "Account creation failed: {}", e);
                result.error = Some(e.to_string());
            }
        }

        result
    }

    async fn update_existing(
        &self,
        email: &str,
        claims: &RoleClaims,
    ) -> Result<(String, Option<String>), ProvisionError> {
        let existing = self
            .auth
            .get_account_by_email(email)
            .await?
            .ok_or_else(|| ProvisionError::LookupMissing(email.to_string()))?;

        self.auth.set_role_claims(&existing.uid, claims).await?;
        info!(email, uid = %existing.uid, "Role claims updated");

        Ok((existing.uid, existing.display_name))
    }
}
