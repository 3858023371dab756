use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::{AccountRecord, AuthAdmin, CreateOutcome, NewAccount, RoleClaims};
use crate::auth::TokenSource;
use crate::error::ServiceError;

const SERVICE: &str = "identitytoolkit";
const PRODUCTION_BASE: &str = "https://identitytoolkit.googleapis.com";

/// Identity Toolkit admin REST client (Firebase Authentication)
#[derive(Debug, Clone)]
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: Arc<TokenSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl IdentityToolkitClient {
    pub fn new(http: reqwest::Client, project_id: impl Into<String>, tokens: Arc<TokenSource>) -> Self {
        Self::with_base_url(http, PRODUCTION_BASE, project_id, tokens)
    }

    /// Emulator (`http://host/identitytoolkit.googleapis.com`) or test server
    pub fn with_base_url(
        http: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<TokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            tokens,
        }
    }

    fn accounts_url(&self, action: Option<&str>) -> String {
        let base = format!("{}/v1/projects/{}/accounts", self.base_url, self.project_id);
        match action {
            Some(action) => format!("{}:{}", base, action),
            None => base,
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, ServiceError> {
        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::transport(SERVICE, e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ServiceError::transport(SERVICE, e))?;
        if !status.is_success() {
            return Err(ServiceError::from_response(SERVICE, status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ServiceError::decode(SERVICE, e.to_string()))
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<String, ServiceError> {
        let body = json!({
            "email": account.email,
            "password": account.password,
            "displayName": account.display_name,
            "emailVerified": account.email_verified,
        });
        let created = self.post(&self.accounts_url(None), &body).await?;
        let parsed: SignUpResponse =
            serde_json::from_value(created).map_err(|e| ServiceError::decode(SERVICE, e.to_string()))?;
        Ok(parsed.local_id)
    }
}

#[async_trait]
impl AuthAdmin for IdentityToolkitClient {
    async fn create_account(&self, account: &NewAccount) -> CreateOutcome {
        debug!("Creating account {}", account.email);
        self.sign_up(account).await.into()
    }

    async fn set_role_claims(&self, uid: &str, claims: &RoleClaims) -> Result<(), ServiceError> {
        // customAttributes is a JSON-encoded string, not an object
        let attributes =
            serde_json::to_string(claims).map_err(|e| ServiceError::decode(SERVICE, e.to_string()))?;
        let body = json!({
            "localId": uid,
            "customAttributes": attributes,
        });
        self.post(&self.accounts_url(Some("update")), &body).await?;
        debug!("Set claims on {}", uid);
        Ok(())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>, ServiceError> {
        let body = json!({ "email": [email] });
        let response = match self.post(&self.accounts_url(Some("lookup")), &body).await {
            Ok(v) => v,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let parsed: LookupResponse = if response.is_null() {
            LookupResponse { users: Vec::new() }
        } else {
            serde_json::from_value(response).map_err(|e| ServiceError::decode(SERVICE, e.to_string()))?
        };

        Ok(parsed.users.into_iter().next().map(|user| AccountRecord {
            uid: user.local_id,
            email: user.email.unwrap_or_else(|| email.to_string()),
            display_name: user.display_name,
        }))
    }
}
