//! Warden Testing Infrastructure
//!
//! In-memory handlers for the artifact store and vector store, plus shared
//! fixtures, so every crate tests against the same store semantics.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! warden-testkit = { path = "../warden-testkit" }
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warden_testkit::*;
//!
//! let artifacts = MockArtifactStore::new();
//! let vectors = MockVectorStore::new().with_collection(movie_settings(true));
//! let _handles = (Arc::new(artifacts), Arc::new(vectors));
//! ```

#![forbid(unsafe_code)]

/// In-memory artifact store
pub mod artifact_store;

/// Shared fixtures
pub mod fixtures;

/// In-memory vector store
pub mod vector_store;

pub use artifact_store::{ArtifactCallCounts, MockArtifactStore};
pub use fixtures::*;
pub use vector_store::MockVectorStore;

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; output goes through the test harness writer so it is only
/// shown for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
