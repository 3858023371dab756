use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::{self, CredentialsError, TokenSource};
use crate::config::{AdminConfig, DEFAULT_EMULATOR_PROJECT};
use crate::firestore::FirestoreClient;
use crate::identity::IdentityToolkitClient;

/// Authenticated clients for both remote services
#[derive(Debug, Clone)]
pub struct Clients {
    pub project_id: String,
    pub auth: IdentityToolkitClient,
    pub store: FirestoreClient,
}

impl Clients {
    /// Resolve credentials (or emulators) and build the clients.
    ///
    /// Fails when no usable service account can be found and at least one
    /// service is not emulated.
    pub fn connect(config: &AdminConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let emulator_tokens = Arc::new(TokenSource::emulator());

        let (project_id, account_tokens) = if config.emulators.all_emulated() {
            let project = config
                .credentials
                .project_id
                .clone()
                .unwrap_or_else(|| DEFAULT_EMULATOR_PROJECT.to_string());
            (project, emulator_tokens.clone())
        } else {
            let path = auth::discover(&config.credentials)?;
            let account = auth::load_service_account(&path)?;
            info!("Using service account {} ({})", account.client_email, path.display());

            let project = config
                .credentials
                .project_id
                .clone()
                .or_else(|| account.project_id.clone())
                .ok_or(CredentialsError::MissingProject)?;
            (project, Arc::new(TokenSource::service_account(account, http.clone())))
        };

        let auth = match &config.emulators.auth_host {
            Some(host) => {
                info!("Using Auth emulator at {}", host);
                IdentityToolkitClient::with_base_url(
                    http.clone(),
                    format!("http://{}/identitytoolkit.googleapis.com", host),
                    project_id.clone(),
                    emulator_tokens.clone(),
                )
            }
            None => IdentityToolkitClient::new(http.clone(), project_id.clone(), account_tokens.clone()),
        };

        let store = match &config.emulators.firestore_host {
            Some(host) => {
                info!("Using Firestore emulator at {}", host);
                FirestoreClient::with_base_url(
                    http.clone(),
                    format!("http://{}", host),
                    project_id.clone(),
                    emulator_tokens,
                )
            }
            None => FirestoreClient::new(http, project_id.clone(), account_tokens),
        };

        Ok(Self {
            project_id,
            auth,
            store,
        })
    }
}
