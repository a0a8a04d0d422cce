//! Naming constants and pure identifier transforms
//!
//! Every storage name Warden produces is derived here. Nothing in this module
//! performs I/O.

use crate::errors::{WardenError, WardenResult};

/// Separates the shared-namespace prefix from a collection's short name
pub const COLLECTION_DELIMITER: &str = "__DELIM__";

/// Separates hierarchy segments inside artifact ids
pub const ARTIFACT_DELIMITER: &str = ":";

/// Namespace token every collection is stored under, regardless of caller
pub const SHARED_WORKSPACE: &str = "SHARED";

/// Longest identifier accepted for any single segment
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Reject empty, oversized or delimiter-bearing identifiers
pub fn validate_identifier(kind: &str, value: &str) -> WardenResult<()> {
    if value.trim().is_empty() {
        return Err(WardenError::validation(format!("{kind} must not be empty")));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(WardenError::validation(format!(
            "{kind} exceeds {MAX_IDENTIFIER_LEN} bytes"
        )));
    }
    for delimiter in [ARTIFACT_DELIMITER, COLLECTION_DELIMITER] {
        if value.contains(delimiter) {
            return Err(WardenError::validation(format!(
                "{kind} '{value}' must not contain '{delimiter}'"
            )));
        }
    }
    Ok(())
}

/// Validate a workspace identifier
pub fn validate_workspace(workspace: &str) -> WardenResult<()> {
    validate_identifier("Workspace", workspace)
}

/// Render a workspace token the way collection names embed it
///
/// Hyphens become underscores and the result is capitalized.
pub fn format_workspace(workspace: &str) -> String {
    let normalized = workspace.replace('-', "_");
    let mut chars = normalized.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Storage name for a caller-facing collection name
pub fn full_collection_name(short_name: &str) -> WardenResult<String> {
    validate_identifier("Collection name", short_name)?;
    Ok(format!(
        "{}{COLLECTION_DELIMITER}{short_name}",
        format_workspace(SHARED_WORKSPACE)
    ))
}

/// Recover the caller-facing name from a storage name.
///
/// Names without the namespace delimiter are returned unchanged.
pub fn short_collection_name(full_name: &str) -> &str {
    match full_name.split_once(COLLECTION_DELIMITER) {
        Some((_, short)) => short,
        None => full_name,
    }
}

/// Join hierarchy segments into an artifact id
pub fn join_segments(segments: &[&str]) -> String {
    segments.join(ARTIFACT_DELIMITER)
}

/// Tenant name the vector store accepts for a workspace
pub fn tenant_name(workspace: &str) -> String {
    workspace.to_lowercase().replace('|', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn collections_share_one_namespace() {
        assert_eq!(full_collection_name("Movie").unwrap(), "Shared__DELIM__Movie");
        assert_eq!(short_collection_name("Shared__DELIM__Movie"), "Movie");
        assert_eq!(short_collection_name("Movie"), "Movie");
    }

    #[test]
    fn workspace_formatting_matches_storage_convention() {
        assert_eq!(format_workspace("SHARED"), "Shared");
        assert_eq!(format_workspace("ws-user-1"), "Ws_user_1");
        assert_eq!(format_workspace(""), "");
    }

    #[test]
    fn delimiters_are_forbidden_in_names() {
        assert_matches!(
            full_collection_name("a__DELIM__b"),
            Err(WardenError::Validation { .. })
        );
        assert_matches!(
            validate_identifier("Application id", "app:1"),
            Err(WardenError::Validation { .. })
        );
        assert_matches!(validate_workspace("   "), Err(WardenError::Validation { .. }));
        assert_matches!(
            validate_workspace(&"w".repeat(MAX_IDENTIFIER_LEN + 1)),
            Err(WardenError::Validation { .. })
        );
        assert!(validate_workspace("ws-user-google-oauth2|1042").is_ok());
    }

    #[test]
    fn delimiters_are_distinct() {
        assert_ne!(COLLECTION_DELIMITER, ARTIFACT_DELIMITER);
        assert!(!COLLECTION_DELIMITER.contains(ARTIFACT_DELIMITER));
    }

    #[test]
    fn tenant_names_are_lowercase_without_pipes() {
        assert_eq!(
            tenant_name("ws-user-Google-OAuth2|1042"),
            "ws-user-google-oauth2_1042"
        );
    }
}
