use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::portal::PortalId;

/// A portal as declared in configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub id: PortalId,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path of a module's service routes; `{folder}` is replaced by the module folder.
    pub service_route_template: String,
    /// The pre-migration module layout that `-old` routes keep resolving.
    pub legacy_route_template: String,
    /// Per-mapper deadline. `None` runs mappers inline without a bound.
    pub mapper_timeout_ms: Option<u64>,
    pub portals: Vec<PortalConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            service_route_template: "API/{folder}".to_string(),
            legacy_route_template: "DesktopModules/{folder}/API".to_string(),
            mapper_timeout_ms: None,
            portals: Vec::new(),
        }
    }
}

impl RoutingConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: RoutingConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(
            "RoutingConfig: loaded {} portal(s) from {}",
            config.portals.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn mapper_timeout(&self) -> Option<Duration> {
        self.mapper_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_route_template.trim_matches('/').is_empty() {
            return Err(ConfigError::Invalid("service_route_template must not be empty".into()));
        }
        if self.legacy_route_template.trim_matches('/').is_empty() {
            return Err(ConfigError::Invalid("legacy_route_template must not be empty".into()));
        }
        if self.mapper_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid("mapper_timeout_ms must be positive".into()));
        }

        let mut seen = HashSet::new();
        for portal in &self.portals {
            if !seen.insert(portal.id) {
                return Err(ConfigError::Invalid(format!(
                    "portal {} is declared more than once",
                    portal.id
                )));
            }
        }
        Ok(())
    }
}
