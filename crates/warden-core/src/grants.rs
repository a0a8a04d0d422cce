//! Permission maps
//!
//! [`PermissionMap`] is the raw `workspace -> token` map exactly as the artifact
//! store persists it in `config.permissions`. [`PermissionGrants`] is the
//! validated form callers hand in when editing or creating resources.

use crate::errors::{WardenError, WardenResult};
use crate::identity::validate_workspace;
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Map key that applies to every workspace not otherwise listed
pub const EVERYONE: &str = "*";

/// Stored permission map (`config.permissions`), tokens kept as opaque strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<String, String>);

impl PermissionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the grant for `workspace`.
    ///
    /// Falls back to the `"*"` entry when the workspace is not listed. A listed
    /// entry holding an unknown token resolves to the empty grant and does not
    /// fall through to `"*"`.
    pub fn grant_for(&self, workspace: &str) -> Option<Operation> {
        let token = self.0.get(workspace).or_else(|| self.0.get(EVERYONE))?;
        match Operation::parse(token) {
            Ok(op) => Some(op),
            Err(_) => {
                tracing::warn!(
                    workspace = %workspace,
                    token = %token,
                    "Ignoring unknown operation token in stored permissions"
                );
                None
            }
        }
    }

    /// Raw token stored for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Overlay `grants` on top of the current entries; later entries win per key
    pub fn merged_with(&self, grants: &PermissionGrants) -> Self {
        let mut merged = self.0.clone();
        for (workspace, op) in grants.iter() {
            merged.insert(workspace.to_string(), op.as_str().to_string());
        }
        Self(merged)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no entry is stored
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over raw entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<&PermissionGrants> for PermissionMap {
    fn from(grants: &PermissionGrants) -> Self {
        Self(
            grants
                .iter()
                .map(|(k, v)| (k.to_string(), v.as_str().to_string()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for PermissionMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Validated caller-supplied grants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct PermissionGrants(BTreeMap<String, Operation>);

impl PermissionGrants {
    /// Create an empty set of grants
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the grant for a workspace (or `"*"`)
    pub fn insert(&mut self, workspace: impl Into<String>, op: Operation) -> WardenResult<()> {
        let workspace = workspace.into();
        if workspace != EVERYONE {
            validate_workspace(&workspace)?;
        }
        self.0.insert(workspace, op);
        Ok(())
    }

    /// Builder-style insert
    pub fn with(mut self, workspace: impl Into<String>, op: Operation) -> WardenResult<Self> {
        self.insert(workspace, op)?;
        Ok(self)
    }

    /// Parse `(workspace, token)` pairs, rejecting unknown tokens
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> WardenResult<Self> {
        let mut grants = Self::new();
        for (workspace, token) in pairs {
            grants.insert(workspace, Operation::parse(token)?)?;
        }
        Ok(grants)
    }

    /// Grant recorded for a key
    pub fn get(&self, workspace: &str) -> Option<Operation> {
        self.0.get(workspace).copied()
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, Operation)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no grant is recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for PermissionGrants {
    type Error = WardenError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_pairs(raw.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

impl From<PermissionGrants> for BTreeMap<String, String> {
    fn from(grants: PermissionGrants) -> Self {
        grants
            .0
            .into_iter()
            .map(|(k, v)| (k, v.as_str().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn stored(pairs: &[(&str, &str)]) -> PermissionMap {
        PermissionMap::from(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn explicit_entry_wins_over_everyone() {
        let map = stored(&[("*", "r"), ("alice", "rw")]);
        assert_eq!(map.grant_for("alice"), Some(Operation::ReadWrite));
        assert_eq!(map.grant_for("bob"), Some(Operation::Read));
    }

    #[test]
    fn missing_entries_resolve_to_empty_grant() {
        let map = stored(&[("alice", "rw")]);
        assert_eq!(map.grant_for("bob"), None);
    }

    #[test]
    fn unknown_stored_token_does_not_fall_back() {
        let map = stored(&[("*", "*"), ("alice", "write")]);
        assert_eq!(map.grant_for("alice"), None);
        assert_eq!(map.grant_for("bob"), Some(Operation::All));
    }

    #[test]
    fn merge_overwrites_only_listed_keys() {
        let map = stored(&[("a", "rw"), ("b", "r")]);
        let grants = PermissionGrants::from_pairs([("a", "r"), ("c", "*")]).unwrap();
        assert_eq!(map.merged_with(&grants), stored(&[("a", "r"), ("b", "r"), ("c", "*")]));
    }

    #[test]
    fn grants_reject_unknown_tokens_and_empty_keys() {
        assert_matches!(
            PermissionGrants::from_pairs([("a", "admin")]),
            Err(WardenError::Validation { .. })
        );
        assert_matches!(
            PermissionGrants::new().with("  ", Operation::Read),
            Err(WardenError::Validation { .. })
        );
    }

    #[test]
    fn grants_deserialize_from_wire_map() {
        let grants: PermissionGrants = serde_json::from_str(r#"{"*":"r","ws-1":"rw+"}"#).unwrap();
        assert_eq!(grants.get("*"), Some(Operation::Read));
        assert_eq!(grants.get("ws-1"), Some(Operation::ReadWriteManage));
        assert!(serde_json::from_str::<PermissionGrants>(r#"{"ws":"x"}"#).is_err());
    }
}
