//! Bearer token acquisition for the Dataverse Web API

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::AuthConfig;

const AUTHORITY: &str = "https://login.microsoftonline.com";

/// Where the bearer token comes from
#[derive(Debug, Clone)]
pub enum TokenSource {
    Static(String),
    ClientCredentials {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl TokenSource {
    /// A static token wins over app credentials
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        if let Some(token) = &auth.access_token {
            return Ok(Self::Static(token.clone()));
        }
        match (&auth.tenant_id, &auth.client_id, &auth.client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Ok(Self::ClientCredentials {
                tenant_id: tenant_id.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => bail!("Incomplete auth configuration: need an access token or tenant/client credentials"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Acquires the token once and hands out the cached value afterwards
#[derive(Debug)]
pub struct AuthManager {
    http: reqwest::Client,
    source: TokenSource,
    resource: String,
    token: OnceCell<String>,
}

impl AuthManager {
    pub fn new(http: reqwest::Client, source: TokenSource, resource: impl Into<String>) -> Self {
        Self {
            http,
            source,
            resource: resource.into(),
            token: OnceCell::new(),
        }
    }

    pub async fn token(&self) -> Result<&str> {
        let token = self.token.get_or_try_init(|| self.acquire()).await?;
        Ok(token.as_str())
    }

    async fn acquire(&self) -> Result<String> {
        match &self.source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ClientCredentials {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let url = format!("{}/{}/oauth2/v2.0/token", AUTHORITY, tenant_id);
                let scope = format!("{}/.default", self.resource);
                log::debug!("Requesting client-credentials token for {}", self.resource);

                let response = self
                    .http
                    .post(&url)
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                        ("scope", scope.as_str()),
                    ])
                    .send()
                    .await
                    .context("Token request failed")?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    bail!("Token endpoint returned {}: {}", status, body);
                }

                let token: TokenResponse = response
                    .json()
                    .await
                    .context("Token endpoint returned an unexpected body")?;
                log::info!(
                    "Acquired access token (expires in {}s)",
                    token.expires_in.unwrap_or_default()
                );
                Ok(token.access_token)
            }
        }
    }
}
