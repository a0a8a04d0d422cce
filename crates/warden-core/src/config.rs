//! Warden configuration
//!
//! Layered the usual way: built-in defaults, then a TOML file, then
//! `WARDEN_*` environment variables, then [`WardenConfig::validate`].

use crate::errors::{WardenError, WardenResult};
use crate::identity::validate_workspace;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding a comma-separated admin list
pub const ENV_ADMIN_WORKSPACES: &str = "WARDEN_ADMIN_WORKSPACES";
/// Environment variable overriding the artifact type
pub const ENV_ARTIFACT_TYPE: &str = "WARDEN_ARTIFACT_TYPE";
/// Environment variable toggling file removal on delete
pub const ENV_DELETE_FILES: &str = "WARDEN_DELETE_FILES";

const DEFAULT_ARTIFACT_TYPE: &str = "collection";

/// Runtime configuration for the access-control layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Workspaces that bypass every permission check
    pub admin_workspaces: Vec<String>,
    /// Artifact type written on every created artifact
    pub artifact_type: String,
    /// Whether artifact deletion also removes stored files
    pub delete_files: bool,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            admin_workspaces: Vec::new(),
            artifact_type: DEFAULT_ARTIFACT_TYPE.to_string(),
            delete_files: true,
        }
    }
}

impl WardenConfig {
    /// Configuration with the given admins and defaults elsewhere
    pub fn with_admins<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admin_workspaces: admins.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> WardenResult<Self> {
        toml::from_str(content).map_err(|e| WardenError::config(format!("Invalid TOML: {e}")))
    }

    /// Load a TOML file
    pub fn load_from_file(path: &Path) -> WardenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WardenError::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `WARDEN_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> WardenResult<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `WARDEN_*` overrides from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> WardenResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                ENV_ADMIN_WORKSPACES => {
                    self.admin_workspaces = value
                        .split(',')
                        .map(str::trim)
                        .filter(|ws| !ws.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                ENV_ARTIFACT_TYPE => self.artifact_type = value.trim().to_string(),
                ENV_DELETE_FILES => {
                    self.delete_files = value.trim().parse().map_err(|_| {
                        WardenError::config(format!(
                            "{ENV_DELETE_FILES} must be 'true' or 'false', got '{value}'"
                        ))
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> WardenResult<()> {
        if self.admin_workspaces.is_empty() {
            return Err(WardenError::config(
                "At least one admin workspace must be configured",
            ));
        }
        for workspace in &self.admin_workspaces {
            validate_workspace(workspace)
                .map_err(|e| WardenError::config(format!("Invalid admin workspace: {e}")))?;
        }
        if self.artifact_type.trim().is_empty() {
            return Err(WardenError::config("Artifact type must not be empty"));
        }
        Ok(())
    }

    /// The admin allow-list
    pub fn admin_workspaces(&self) -> AdminWorkspaces {
        AdminWorkspaces::new(self.admin_workspaces.iter().cloned())
    }
}

/// Fixed allow-list of admin workspaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminWorkspaces(Vec<String>);

impl AdminWorkspaces {
    /// Build an allow-list, dropping duplicates while keeping order
    pub fn new<I, S>(workspaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        for ws in workspaces {
            let ws = ws.into();
            if !list.contains(&ws) {
                list.push(ws);
            }
        }
        Self(list)
    }

    /// Whether `workspace` is an admin
    pub fn contains(&self, workspace: &str) -> bool {
        self.0.iter().any(|ws| ws == workspace)
    }

    /// Iterate over admin workspaces
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of admins
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no admin is configured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
