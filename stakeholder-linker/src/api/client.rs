//! Dataverse Web API client

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::auth::{AuthManager, TokenSource};
use super::pluralization::entity_set_name;
use crate::config::Config;

/// Safety net against a server that keeps handing out nextLinks
const MAX_PAGES: usize = 100;

/// FetchXML responses flag further pages with this annotation instead of a nextLink
const MORE_RECORDS: &str = "@Microsoft.Dynamics.CRM.morerecords";

/// Read access to the remote record store
///
/// Mirrors `retrieveMultipleRecords(entityLogicalName, options)`: `options` is
/// the raw `?...` string (OData options or `?fetchXml=...`).
#[async_trait]
pub trait WebApi: Send + Sync {
    async fn retrieve_multiple(&self, entity: &str, options: &str) -> Result<Vec<Value>>;
}

/// HTTP client bound to one Dataverse environment
#[derive(Debug)]
pub struct DynamicsClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    auth: AuthManager,
    entity_sets: HashMap<String, String>,
}

impl DynamicsClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.environment.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = config.base_url().to_string();
        let auth = AuthManager::new(
            http.clone(),
            TokenSource::from_config(&config.auth)?,
            base_url.clone(),
        );

        Ok(Self {
            http,
            base_url,
            api_version: config.environment.api_version.clone(),
            auth,
            entity_sets: config.schema.entity_sets.clone(),
        })
    }

    /// Collection URL for a logical entity name
    pub fn collection_url(&self, entity: &str) -> String {
        format!(
            "{}/api/data/{}/{}",
            self.base_url,
            self.api_version,
            entity_set_name(entity, &self.entity_sets)
        )
    }

    async fn headers(&self) -> Result<HeaderMap> {
        let token = self.auth.token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).context("Access token is not a valid header value")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("odata-maxversion", HeaderValue::from_static("4.0"));
        headers.insert("odata-version", HeaderValue::from_static("4.0"));
        headers.insert(
            "prefer",
            HeaderValue::from_static("odata.include-annotations=\"OData.Community.Display.V1.FormattedValue\""),
        );
        Ok(headers)
    }

    async fn get_page(&self, url: &str) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .headers(self.headers().await?)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Web API returned {}: {}", status, body);
        }

        response.json().await.context("Web API returned invalid JSON")
    }
}

#[async_trait]
impl WebApi for DynamicsClient {
    async fn retrieve_multiple(&self, entity: &str, options: &str) -> Result<Vec<Value>> {
        let start = Instant::now();
        let mut url = format!("{}{}", self.collection_url(entity), options);
        let mut records = Vec::new();

        for page in 0..MAX_PAGES {
            log::debug!("GET {} (page {})", url, page + 1);
            let body = self.get_page(&url).await?;

            match body.get("value").and_then(Value::as_array) {
                Some(values) => records.extend(values.iter().cloned()),
                None => bail!("Web API response for {} has no 'value' array", entity),
            }

            match body.get("@odata.nextLink").and_then(Value::as_str) {
                Some(next) => url = next.to_string(),
                None => {
                    if has_more_records(&body) {
                        log::warn!(
                            "{} results were truncated at {} records; FetchXML paging cookies are not followed",
                            entity,
                            records.len()
                        );
                    }
                    log::info!(
                        "Retrieved {} {} records in {:.2}ms",
                        records.len(),
                        entity,
                        start.elapsed().as_secs_f64() * 1000.0
                    );
                    return Ok(records);
                }
            }
        }

        log::warn!("Stopped following nextLink for {} after {} pages", entity, MAX_PAGES);
        Ok(records)
    }
}

/// Whether a FetchXML page says more records exist
fn has_more_records(body: &Value) -> bool {
    body.get(MORE_RECORDS).and_then(Value::as_bool).unwrap_or(false)
}
