//! Configuration loading
//!
//! Settings live in `<config_dir>/stakeholder-linker/config.toml`. Every field
//! has a default, so a missing file or a partial one is fine. Connection
//! settings can be overridden from the environment (a `.env` file is picked up
//! by `main` via dotenvy).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "stakeholder-linker";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub environment: EnvironmentConfig,
    pub auth: AuthConfig,
    pub schema: SchemaConfig,
    pub workflow: WorkflowConfig,
    pub view: ViewConfig,
}

/// Target Dataverse environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// e.g. `https://contoso.crm5.dynamics.com`
    pub url: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_version: "v9.2".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Either a ready-made bearer token or app registration credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Logical names of the entities and attributes involved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub stakeholder_entity: String,
    pub stakeholder_id: String,
    pub stakeholder_name: String,
    pub stakeholder_contact_info: String,
    /// N:N intersect entity between stakeholder and opportunity
    pub link_entity: String,
    pub link_from: String,
    pub link_to: String,
    /// Column on the intersect entity holding the opportunity id
    pub link_parent_attribute: String,
    pub link_alias: String,
    /// Entity set names that don't follow the plural rules
    pub entity_sets: HashMap<String, String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            stakeholder_entity: "crff8_stakeholder".to_string(),
            stakeholder_id: "crff8_stakeholderid".to_string(),
            stakeholder_name: "crff8_name".to_string(),
            stakeholder_contact_info: "crff8_contactinfo".to_string(),
            link_entity: "crff8_stakeholder_opportunity".to_string(),
            link_from: "crff8_stakeholderid".to_string(),
            link_to: "crff8_stakeholderid".to_string(),
            link_parent_attribute: "opportunityid".to_string(),
            link_alias: "link".to_string(),
            entity_sets: HashMap::new(),
        }
    }
}

/// Power Automate flow performing the association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Schema name of the environment variable holding the flow URL
    pub endpoint_variable: String,
    pub parent_field: String,
    pub member_field: String,
    pub timeout_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            endpoint_variable: "crff8_AssociateFlow".to_string(),
            parent_field: "opportunity".to_string(),
            member_field: "stakeholder".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Keep the selection when the user clicks outside any row
    pub preserve_selection_on_empty_click: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            preserve_selection_on_empty_click: true,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine the user config directory")?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path` (or the default location), then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = if path.exists() {
            log::debug!("Loading config from {}", path.display());
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Write the config, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply `DYNAMICS_*` overrides from the given lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("DYNAMICS_URL") {
            self.environment.url = url;
        }
        if let Some(token) = lookup("DYNAMICS_ACCESS_TOKEN") {
            self.auth.access_token = Some(token);
        }
        if let Some(tenant) = lookup("DYNAMICS_TENANT_ID") {
            self.auth.tenant_id = Some(tenant);
        }
        if let Some(client_id) = lookup("DYNAMICS_CLIENT_ID") {
            self.auth.client_id = Some(client_id);
        }
        if let Some(secret) = lookup("DYNAMICS_CLIENT_SECRET") {
            self.auth.client_secret = Some(secret);
        }
    }

    /// Check the settings needed to talk to an environment
    pub fn validate(&self) -> Result<()> {
        let url = self.environment.url.trim();
        if url.is_empty() {
            bail!("No environment URL configured. Set [environment].url or DYNAMICS_URL.");
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            bail!("Environment URL must start with http:// or https://, got '{}'", url);
        }

        let auth = &self.auth;
        let has_credentials =
            auth.tenant_id.is_some() && auth.client_id.is_some() && auth.client_secret.is_some();
        if auth.access_token.is_none() && !has_credentials {
            bail!(
                "No credentials configured. Provide DYNAMICS_ACCESS_TOKEN, or tenant_id, client_id and client_secret."
            );
        }
        Ok(())
    }

    /// Environment URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.environment.url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [environment]
            url = "https://contoso.crm5.dynamics.com"

            [workflow]
            endpoint_variable = "crff8_LinkFlow"
            "#,
        )
        .unwrap();

        assert_eq!(config.environment.url, "https://contoso.crm5.dynamics.com");
        assert_eq!(config.environment.api_version, "v9.2");
        assert_eq!(config.workflow.endpoint_variable, "crff8_LinkFlow");
        assert_eq!(config.workflow.parent_field, "opportunity");
        assert_eq!(config.schema.stakeholder_entity, "crff8_stakeholder");
        assert!(config.view.preserve_selection_on_empty_click);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.environment.url = "https://org.crm.dynamics.com".to_string();
        config
            .schema
            .entity_sets
            .insert("crff8_stakeholder".to_string(), "crff8_stakeholderset".to_string());

        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_env_overrides_ignore_blank_values() {
        let mut config = Config::default();
        config.environment.url = "https://from-file.crm.dynamics.com".to_string();

        config.apply_overrides(|key| match key {
            "DYNAMICS_URL" => Some("   ".to_string()),
            "DYNAMICS_ACCESS_TOKEN" => Some("token-123".to_string()),
            _ => None,
        });

        assert_eq!(config.environment.url, "https://from-file.crm.dynamics.com");
        assert_eq!(config.auth.access_token.as_deref(), Some("token-123"));
    }

    #[test]
    fn test_validate_requires_url_and_credentials() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.environment.url = "https://org.crm.dynamics.com/".to_string();
        assert!(config.validate().is_err());

        config.auth.client_id = Some("app".to_string());
        config.auth.client_secret = Some("secret".to_string());
        assert!(config.validate().is_err());

        config.auth.tenant_id = Some("tenant".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), "https://org.crm.dynamics.com");
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("stakeholder-linker-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.view.preserve_selection_on_empty_click = false;
        config.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(Config::from_toml(&content).unwrap(), config);

        let _ = fs::remove_dir_all(&dir);
    }
}
