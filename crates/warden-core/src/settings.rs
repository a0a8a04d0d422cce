//! Vector collection settings
//!
//! Settings are an opaque JSON document owned by the vector store. Warden only
//! reads the `class`, `description` and `multiTenancyConfig.enabled` fields and
//! rewrites `class` between caller-facing and storage names.

use crate::errors::{WardenError, WardenResult};
use crate::identity::{
    format_workspace, full_collection_name, short_collection_name, validate_identifier,
    COLLECTION_DELIMITER, SHARED_WORKSPACE,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CLASS_KEY: &str = "class";

/// Collection settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct CollectionSettings(Map<String, Value>);

impl CollectionSettings {
    /// Wrap a settings document, requiring an object with a string `class`
    pub fn from_value(value: Value) -> WardenResult<Self> {
        let Value::Object(map) = value else {
            return Err(WardenError::validation(
                "Collection settings must be a JSON object",
            ));
        };
        match map.get(CLASS_KEY) {
            Some(Value::String(class)) => {
                if let Some((namespace, _)) = class.split_once(COLLECTION_DELIMITER) {
                    if namespace != format_workspace(SHARED_WORKSPACE) {
                        return Err(WardenError::validation(format!(
                            "Collection '{class}' is outside the shared namespace"
                        )));
                    }
                }
                validate_identifier("Collection name", short_collection_name(class))?;
            }
            _ => {
                return Err(WardenError::validation(
                    "The 'class' field in collection settings must be a string",
                ))
            }
        }
        Ok(Self(map))
    }

    /// The `class` field as stored in this document
    pub fn class(&self) -> &str {
        self.0
            .get(CLASS_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The `description` field, if any
    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    /// Whether the document enables multi-tenancy
    pub fn multi_tenancy_enabled(&self) -> bool {
        self.0
            .get("multiTenancyConfig")
            .and_then(|cfg| cfg.get("enabled"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Copy of these settings with `class` rewritten to the storage name
    pub fn with_full_name(&self) -> WardenResult<Self> {
        let full = full_collection_name(short_collection_name(self.class()))?;
        Ok(self.with_class(full))
    }

    /// Copy of these settings with `class` rewritten to the caller-facing name
    pub fn with_short_name(&self) -> Self {
        let short = short_collection_name(self.class()).to_string();
        self.with_class(short)
    }

    fn with_class(&self, class: String) -> Self {
        let mut map = self.0.clone();
        map.insert(CLASS_KEY.to_string(), Value::String(class));
        Self(map)
    }

    /// Borrow the raw document
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The document as a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl TryFrom<Value> for CollectionSettings {
    type Error = WardenError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<CollectionSettings> for Value {
    fn from(settings: CollectionSettings) -> Self {
        Value::Object(settings.0)
    }
}
