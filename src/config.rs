//! Desired-state configuration
//!
//! One TOML file describes the router to talk to and every resource
//! instance it should carry:
//!
//! ```toml
//! [device]
//! url = "https://192.168.88.1"
//! username = "admin"
//! password_env = "ROSCFG_PASSWORD"
//!
//! [[resource]]
//! kind = "interface_bonding"
//! key = "uplink"
//!
//! [resource.properties]
//! name = "bond1"
//! slaves = ["ether3", "ether4"]
//! mode = "802.3ad"
//! ```

use anyhow::{Context, Result, bail};
use declarative::{DesiredInstance, Registry, State, Value};
use roskit::{ConnectionConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable read for the password when none is configured
pub const DEFAULT_PASSWORD_ENV: &str = "ROSCFG_PASSWORD";

// ============================================================================
// Config Structures
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoscfgConfig {
    pub device: DeviceConfig,

    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Base URL of the router, e.g. `https://192.168.88.1`
    pub url: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Inline password. Prefer `password_env`.
    #[serde(default)]
    pub password: Option<String>,

    /// Environment variable holding the password
    #[serde(default = "default_password_env")]
    pub password_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verify the router's TLS certificate
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff_factor: default_backoff_factor(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// One desired instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Registry name, e.g. `interface_bonding`
    pub kind: String,
    /// Local label, unique per kind
    pub key: String,
    #[serde(default)]
    pub properties: toml::Table,
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password_env() -> String {
    DEFAULT_PASSWORD_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_verify_tls() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    10_000
}

// ============================================================================
// Loading and Validation
// ============================================================================

impl RoscfgConfig {
    /// Load the config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        log::debug!("Loaded config with {} resources", config.resources.len());
        Ok(config)
    }

    /// Reject unknown kinds and duplicate `(kind, key)` pairs.
    pub fn validate(&self, registry: &Registry) -> Result<()> {
        let mut seen = BTreeSet::new();
        for resource in &self.resources {
            if !registry.contains(&resource.kind) {
                bail!(
                    "Unknown resource kind '{}' (key '{}'). Run 'roscfg kinds' to list kinds.",
                    resource.kind,
                    resource.key
                );
            }
            if !seen.insert((resource.kind.as_str(), resource.key.as_str())) {
                bail!("Duplicate resource {}.{}", resource.kind, resource.key);
            }
        }
        Ok(())
    }

    /// Desired instances with typed properties.
    pub fn desired_instances(&self) -> Result<Vec<DesiredInstance>> {
        self.resources
            .iter()
            .map(|resource| {
                let properties = properties_to_state(&resource.properties)
                    .with_context(|| format!("In resource {}.{}", resource.kind, resource.key))?;
                Ok(DesiredInstance {
                    kind: resource.kind.clone(),
                    key: resource.key.clone(),
                    properties,
                })
            })
            .collect()
    }
}

impl DeviceConfig {
    /// Password from the config, else from `password_env`.
    pub fn password(&self) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        std::env::var(&self.password_env).with_context(|| {
            format!(
                "No password configured: set device.password or ${}",
                self.password_env
            )
        })
    }

    pub fn connection(&self) -> Result<ConnectionConfig> {
        let mut connection = ConnectionConfig::new(&self.url, &self.username, self.password()?);
        connection.timeout = Duration::from_secs(self.timeout_secs);
        connection.verify_tls = self.verify_tls;
        Ok(connection)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            backoff_factor: self.retry.backoff_factor,
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
        }
    }
}

// ============================================================================
// TOML to typed values
// ============================================================================

fn properties_to_state(table: &toml::Table) -> Result<State> {
    table
        .iter()
        .map(|(name, value)| Ok((name.clone(), value_from_toml(name, value)?)))
        .collect()
}

/// Arrays become lists; integers and booleans inside them become strings.
pub fn value_from_toml(name: &str, value: &toml::Value) -> Result<Value> {
    match value {
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Integer(n) => Ok(Value::Int(*n)),
        toml::Value::String(s) => Ok(Value::String(s.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                toml::Value::String(s) => Ok(s.clone()),
                toml::Value::Integer(n) => Ok(n.to_string()),
                toml::Value::Boolean(b) => Ok(b.to_string()),
                other => bail!(
                    "Property '{name}': list elements must be strings or integers, got {}",
                    other.type_str()
                ),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        other => bail!(
            "Property '{name}': unsupported value of type {}",
            other.type_str()
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================
