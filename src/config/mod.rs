use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_GYM_ID: &str = "gym_demo_001";
pub const DEFAULT_GYM_NAME: &str = "GYM MATCH デモジム";
pub const DEFAULT_EMULATOR_PROJECT: &str = "demo-gym-match";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub environment: Environment,
    pub tenant: TenantConfig,
    pub credentials: CredentialsConfig,
    pub emulators: EmulatorConfig,
    pub http: HttpConfig,
    pub app_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

/// The gym every seeded/purged record belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub gym_id: String,
    pub gym_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Explicit service-account file; wins over directory discovery
    pub path: Option<PathBuf>,
    /// Directory scanned for an `*adminsdk*.json` / `*firebase-admin*.json` key
    pub search_dir: PathBuf,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmulatorConfig {
    pub auth_host: Option<String>,
    pub firestore_host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            gym_id: DEFAULT_GYM_ID.to_string(),
            gym_name: DEFAULT_GYM_NAME.to_string(),
        }
    }
}

impl EmulatorConfig {
    pub fn all_emulated(&self) -> bool {
        self.auth_host.is_some() && self.firestore_host.is_some()
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Tenant overrides
        if let Some(v) = non_empty_var("GYM_ADMIN_GYM_ID") {
            self.tenant.gym_id = v;
        }
        if let Some(v) = non_empty_var("GYM_ADMIN_GYM_NAME") {
            self.tenant.gym_name = v;
        }

        // Credential overrides
        if let Some(v) = non_empty_var("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials.path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty_var("GYM_ADMIN_CREDENTIALS_DIR") {
            self.credentials.search_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty_var("GYM_ADMIN_PROJECT_ID").or_else(|| non_empty_var("GCLOUD_PROJECT")) {
            self.credentials.project_id = Some(v);
        }

        // Emulators
        if let Some(v) = non_empty_var("FIREBASE_AUTH_EMULATOR_HOST") {
            self.emulators.auth_host = Some(v);
        }
        if let Some(v) = non_empty_var("FIRESTORE_EMULATOR_HOST") {
            self.emulators.firestore_host = Some(v);
        }

        if let Ok(v) = env::var("GYM_ADMIN_HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = v.parse().unwrap_or(self.http.timeout_secs);
        }
        if let Some(v) = non_empty_var("GYM_ADMIN_APP_URL") {
            self.app_url = Some(v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            tenant: TenantConfig::default(),
            credentials: CredentialsConfig {
                path: None,
                search_dir: PathBuf::from("/opt/flutter"),
                project_id: None,
            },
            emulators: EmulatorConfig::default(),
            http: HttpConfig { timeout_secs: 30 },
            app_url: None,
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            http: HttpConfig { timeout_secs: 15 },
            ..Self::development()
        }
    }

    /// Copy with the tenant replaced by CLI-provided values
    pub fn with_tenant(&self, gym_id: Option<String>, gym_name: Option<String>) -> Self {
        let mut config = self.clone();
        if let Some(id) = gym_id {
            config.tenant.gym_id = id;
        }
        if let Some(name) = gym_name {
            config.tenant.gym_name = name;
        }
        config
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AdminConfig> = Lazy::new(AdminConfig::from_env);

pub fn config() -> &'static AdminConfig {
    &CONFIG
}
