//! Mapping provider trait definition.

use serde_json::Value;

use content_indexer_shared::ContentCollection;

/// Supplies the target schema for a collection, consumed verbatim at index
/// creation time.
///
/// The pipeline does not validate or generate schemas itself; concrete
/// providers typically load mappings from configuration or embed them.
pub trait MappingProvider: Send + Sync {
    /// The index settings and mappings body for the given collection.
    fn mapping_for(&self, collection: &ContentCollection) -> Value;
}
