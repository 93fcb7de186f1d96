//! Read access to stakeholder data and environment variables
//!
//! List reads degrade to an empty result carrying the error. Configuration
//! lookups propagate their errors to the caller.

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use std::sync::Arc;

use super::models::Stakeholder;
use super::query::build_unlinked_stakeholder_query;
use crate::api::WebApi;
use crate::api::query::{Filter, QueryBuilder};
use crate::config::SchemaConfig;

const DEFINITION_ENTITY: &str = "environmentvariabledefinition";
const VALUE_ENTITY: &str = "environmentvariablevalue";

/// Result of a fail-soft read: records are empty when `error` is set
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome<T> {
    pub records: Vec<T>,
    pub error: Option<String>,
}

impl<T> ReadOutcome<T> {
    pub fn loaded(records: Vec<T>) -> Self {
        Self { records, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn map_records<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> ReadOutcome<U> {
        ReadOutcome {
            records: f(self.records),
            error: self.error,
        }
    }
}

#[derive(Clone)]
pub struct RecordGateway {
    api: Arc<dyn WebApi>,
    schema: SchemaConfig,
}

impl RecordGateway {
    pub fn new(api: Arc<dyn WebApi>, schema: SchemaConfig) -> Self {
        Self { api, schema }
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Fail-soft retrieve-multiple
    pub async fn fetch_entities(&self, entity: &str, options: &str) -> ReadOutcome<Value> {
        match self.api.retrieve_multiple(entity, options).await {
            Ok(records) => {
                log::debug!("Fetched {} {} records", records.len(), entity);
                ReadOutcome::loaded(records)
            }
            Err(e) => {
                log::error!("Error retrieving {} records: {:#}", entity, e);
                ReadOutcome::failed(format!("{:#}", e))
            }
        }
    }

    /// Stakeholders not yet linked to `parent_id`, typed at the boundary
    pub async fn fetch_unlinked_stakeholders(&self, parent_id: &str) -> ReadOutcome<Stakeholder> {
        if !parent_id.is_empty() && uuid::Uuid::parse_str(parent_id).is_err() {
            log::warn!("Parent id '{}' is not a GUID; the query will likely fail", parent_id);
        }

        let query = build_unlinked_stakeholder_query(parent_id, &self.schema);
        let outcome = self
            .fetch_entities(&self.schema.stakeholder_entity, &query.to_options())
            .await;

        outcome.map_records(|records| {
            let total = records.len();
            let stakeholders: Vec<Stakeholder> = records
                .iter()
                .filter_map(|r| Stakeholder::from_record(r, &self.schema))
                .collect();
            if stakeholders.len() < total {
                log::warn!(
                    "Dropped {} stakeholder records without an id",
                    total - stakeholders.len()
                );
            }
            log::info!("{} stakeholders not linked to {}", stakeholders.len(), parent_id);
            stakeholders
        })
    }

    /// Resolve an environment variable value: schema name -> definition id -> value.
    ///
    /// Never cached; the value may be rotated at any time.
    pub async fn fetch_config_value(&self, schema_name: &str) -> Result<String> {
        let definitions_query = QueryBuilder::new(DEFINITION_ENTITY)
            .filter(Filter::eq("schemaname", schema_name))
            .select(&["schemaname", "environmentvariabledefinitionid"])
            .build();
        let definitions = self
            .api
            .retrieve_multiple(DEFINITION_ENTITY, &definitions_query.to_options())
            .await
            .with_context(|| format!("Failed to look up environment variable '{}'", schema_name))?;

        let definition = definitions
            .first()
            .ok_or_else(|| anyhow!("Environment variable '{}' is not defined", schema_name))?;
        let definition_id = definition
            .get("environmentvariabledefinitionid")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Environment variable '{}' has no definition id", schema_name))?;

        let values_query = QueryBuilder::new(VALUE_ENTITY)
            .filter(Filter::lookup_eq("_environmentvariabledefinitionid_value", definition_id))
            .select(&["schemaname", "value"])
            .build();
        let values = self
            .api
            .retrieve_multiple(VALUE_ENTITY, &values_query.to_options())
            .await
            .with_context(|| format!("Failed to read the value of '{}'", schema_name))?;

        let value = values
            .first()
            .and_then(|row| row.get("value"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if value.is_empty() {
            bail!("Environment variable '{}' has no current value", schema_name);
        }

        log::debug!("Resolved environment variable {}", schema_name);
        Ok(value.to_string())
    }
}
