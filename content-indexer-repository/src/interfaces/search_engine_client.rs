//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, mock, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{BulkOperation, BulkSummary};
use content_indexer_shared::TagMutation;

/// Abstract interface for the search engine operations the indexing
/// pipeline depends on: index and alias lifecycle, bulk writes, and the
/// conditional tag update.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Create an index with the given mapping/settings body.
    ///
    /// The mapping is consumed verbatim; the client performs no schema
    /// validation of its own.
    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), SearchError>;

    /// Delete an index by exact name.
    async fn delete_index(&self, index: &str) -> Result<(), SearchError>;

    /// Check whether an index with the exact name exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// List the names of all indices currently bound to an alias.
    ///
    /// Returns an empty list when the alias does not exist yet.
    async fn indices_for_alias(&self, alias: &str) -> Result<Vec<String>, SearchError>;

    /// Bind an alias to an index, in addition to any existing bindings.
    async fn put_alias(&self, index: &str, alias: &str) -> Result<(), SearchError>;

    /// Execute a bulk write of index operations against one index.
    ///
    /// Returns a per-item summary; a partially failed bulk is reported via
    /// the summary, not as an `Err`.
    async fn bulk_index(
        &self,
        index: &str,
        operations: &[BulkOperation],
    ) -> Result<BulkSummary, SearchError>;

    /// Apply an idempotent tag mutation as a server-side conditional update.
    ///
    /// The update must be atomic on the engine side: create the tag field as
    /// a single-element list when absent, do nothing when the value is
    /// already present, append otherwise. A missing target document yields
    /// `SearchError::NotFound`.
    async fn apply_tag(&self, mutation: &TagMutation) -> Result<(), SearchError>;

    /// Check if the search engine is healthy and reachable.
    async fn health_check(&self) -> Result<bool, SearchError>;
}
