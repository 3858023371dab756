use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::CredentialsConfig;
use crate::error::ServiceError;

/// OAuth scopes needed for user management and Firestore access
pub const SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
https://www.googleapis.com/auth/identitytoolkit \
https://www.googleapis.com/auth/datastore";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Token used against the local emulators, which accept any bearer
pub const EMULATOR_TOKEN: &str = "owner";

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("no service account key found in {0} (expected *adminsdk*.json or *firebase-admin*.json)")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service account file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid private key in service account: {0}")]
    InvalidKey(String),

    #[error("no project id configured; set GYM_ADMIN_PROJECT_ID or provide a service account")]
    MissingProject,
}

/// Google service-account key file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccount {
    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

/// JWT-bearer assertion claims (RFC 7523)
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(account: &ServiceAccount, now: DateTime<Utc>) -> Self {
        Self {
            iss: account.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: account.token_uri().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        }
    }
}

pub fn sign_assertion(account: &ServiceAccount, claims: &AssertionClaims) -> Result<String, CredentialsError> {
    let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
        .map_err(|e| CredentialsError::InvalidKey(e.to_string()))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = account.private_key_id.clone();

    encode(&header, claims, &key).map_err(|e| CredentialsError::InvalidKey(e.to_string()))
}

/// Locate the service-account file: explicit path first, then directory scan
pub fn discover(config: &CredentialsConfig) -> Result<PathBuf, CredentialsError> {
    if let Some(path) = &config.path {
        return Ok(path.clone());
    }
    find_key_in_dir(&config.search_dir)
}

fn find_key_in_dir(dir: &Path) -> Result<PathBuf, CredentialsError> {
    let entries = fs::read_dir(dir).map_err(|source| CredentialsError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            name.ends_with(".json") && (name.contains("adminsdk") || name.contains("firebase-admin"))
        })
        .collect();

    // read_dir order is platform dependent
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| CredentialsError::NotFound(dir.to_path_buf()))
}

pub fn load_service_account(path: &Path) -> Result<ServiceAccount, CredentialsError> {
    let content = fs::read_to_string(path).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CredentialsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Tokens are replaced this long before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn usable_at(&self, now: DateTime<Utc>) -> Option<&str> {
        (self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now).then_some(self.value.as_str())
    }
}

fn usable_token(slot: &Option<CachedToken>, now: DateTime<Utc>) -> Option<String> {
    slot.as_ref().and_then(|t| t.usable_at(now)).map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

/// Supplies bearer tokens to the REST clients
#[derive(Debug)]
pub enum TokenSource {
    /// Fixed token (emulators)
    Static(String),
    ServiceAccount {
        account: ServiceAccount,
        http: reqwest::Client,
        cached: RwLock<Option<CachedToken>>,
    },
}

impl TokenSource {
    pub fn emulator() -> Self {
        TokenSource::Static(EMULATOR_TOKEN.to_string())
    }

    pub fn service_account(account: ServiceAccount, http: reqwest::Client) -> Self {
        TokenSource::ServiceAccount {
            account,
            http,
            cached: RwLock::new(None),
        }
    }

    /// Current access token, exchanging a fresh assertion when the cached one is about to expire
    pub async fn bearer(&self) -> Result<String, ServiceError> {
        let (account, http, cached) = match self {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ServiceAccount { account, http, cached } => (account, http, cached),
        };

        // Fast path: try read lock
        if let Some(token) = usable_token(&*cached.read().await, Utc::now()) {
            return Ok(token);
        }

        let mut guard = cached.write().await;
        let now = Utc::now();
        // Another caller may have refreshed while we waited for the write lock
        if let Some(token) = usable_token(&guard, now) {
            return Ok(token);
        }
        let assertion = sign_assertion(account, &AssertionClaims::new(account, now))
            .map_err(|e| ServiceError::Token(e.to_string()))?;

        debug!("Exchanging service account assertion at {}", account.token_uri());
        let response = http
            .post(account.token_uri())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::transport("oauth2", e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ServiceError::transport("oauth2", e))?;
        if !status.is_success() {
            return Err(ServiceError::Token(format!("token endpoint returned {}: {}", status, body)));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ServiceError::decode("oauth2", e.to_string()))?;
        info!("Obtained access token for {}", account.client_email);

        *guard = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(token.access_token)
    }
}
