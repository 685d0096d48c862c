//! Cross-reference linker for the content indexer pipeline.
//!
//! Documents of one collection tag the documents they reference in other,
//! already-published collections (for example a News crawl stamps a
//! `newsTag` onto every Article it links to, which feeds per-item RSS
//! feeds). Tagging is best-effort enrichment: a failed mutation is counted
//! and logged but never aborts the owning run.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use content_indexer_repository::SearchEngineClient;
use content_indexer_shared::naming::index_alias_name;
use content_indexer_shared::{SourceRecord, TagMutation};

/// Which related-entry content types are eligible to receive tags.
#[derive(Debug, Clone, Default)]
pub struct LinkRules {
    target_content_types: HashSet<String>,
}

impl LinkRules {
    /// Create rules for a set of linkable target content-type ids.
    pub fn new(target_content_types: impl IntoIterator<Item = String>) -> Self {
        Self {
            target_content_types: target_content_types.into_iter().collect(),
        }
    }

    /// Collect one mutation per related entry belonging to a linkable
    /// target content type. Pure; execution happens in [`DocumentLinker`].
    pub fn mutations_for(
        &self,
        record: &SourceRecord,
        tag_field: &str,
        tag_value: &str,
    ) -> Vec<TagMutation> {
        record
            .related
            .iter()
            .flat_map(|related| related.iter())
            .filter(|entry| self.target_content_types.contains(&entry.content_type_id))
            .map(|entry| TagMutation {
                target_alias: index_alias_name(&entry.collection_name),
                target_document_id: entry.id.clone(),
                tag_field: tag_field.to_string(),
                tag_value: tag_value.to_string(),
            })
            .collect()
    }
}

/// Statistics of a batch of executed mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Mutations attempted.
    pub attempted: usize,
    /// Mutations that failed.
    pub failed: usize,
}

/// Executes tag mutations against other collections' serving indices.
pub struct DocumentLinker {
    client: Arc<dyn SearchEngineClient>,
}

impl DocumentLinker {
    /// Create a linker writing through the given search client.
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self { client }
    }

    /// Apply a batch of mutations, aggregating failures instead of
    /// propagating them.
    pub async fn apply_all(&self, mutations: &[TagMutation]) -> LinkStats {
        let mut stats = LinkStats {
            attempted: mutations.len(),
            failed: 0,
        };

        for mutation in mutations {
            if let Err(e) = self.client.apply_tag(mutation).await {
                // Target document or index may legitimately be absent
                warn!(
                    alias = %mutation.target_alias,
                    doc_id = %mutation.target_document_id,
                    tag = %mutation.tag_value,
                    error = %e,
                    "Tag mutation failed"
                );
                stats.failed += 1;
            } else {
                debug!(
                    alias = %mutation.target_alias,
                    doc_id = %mutation.target_document_id,
                    field = %mutation.tag_field,
                    "Tagged related document"
                );
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use content_indexer_repository::{BulkOperation, BulkSummary, SearchError};
    use content_indexer_shared::{EntryRef, RelatedEntries};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn mutation(doc_id: &str) -> TagMutation {
        TagMutation {
            target_alias: "article".to_string(),
            target_document_id: doc_id.to_string(),
            tag_field: "newsTag".to_string(),
            tag_value: "news-1".to_string(),
        }
    }

    /// Mock client implementing the three-branch tag semantics on an
    /// in-memory tag store.
    struct MockTagStore {
        tags: Mutex<HashMap<String, Vec<String>>>,
        known_docs: Vec<String>,
    }

    impl MockTagStore {
        fn new(known_docs: &[&str]) -> Self {
            Self {
                tags: Mutex::new(HashMap::new()),
                known_docs: known_docs.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn tags_of(&self, doc_id: &str) -> Vec<String> {
            self.tags
                .lock()
                .unwrap()
                .get(doc_id)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl SearchEngineClient for MockTagStore {
        async fn create_index(&self, _index: &str, _mapping: &Value) -> Result<(), SearchError> {
            Ok(())
        }

        async fn delete_index(&self, _index: &str) -> Result<(), SearchError> {
            Ok(())
        }

        async fn index_exists(&self, _index: &str) -> Result<bool, SearchError> {
            Ok(false)
        }

        async fn indices_for_alias(&self, _alias: &str) -> Result<Vec<String>, SearchError> {
            Ok(Vec::new())
        }

        async fn put_alias(&self, _index: &str, _alias: &str) -> Result<(), SearchError> {
            Ok(())
        }

        async fn bulk_index(
            &self,
            _index: &str,
            _operations: &[BulkOperation],
        ) -> Result<BulkSummary, SearchError> {
            Ok(BulkSummary::empty())
        }

        async fn apply_tag(&self, mutation: &TagMutation) -> Result<(), SearchError> {
            if !self.known_docs.contains(&mutation.target_document_id) {
                return Err(SearchError::not_found(mutation.target_document_id.clone()));
            }
            let mut tags = self.tags.lock().unwrap();
            let entry = tags
                .entry(mutation.target_document_id.clone())
                .or_default();
            if !entry.contains(&mutation.tag_value) {
                entry.push(mutation.tag_value.clone());
            }
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    #[test]
    fn test_rules_match_single_and_list_variants() {
        let rules = LinkRules::new(vec!["ct-article".to_string()]);
        let record = SourceRecord::new("news-1", "ct-news", json!({})).with_related(vec![
            RelatedEntries::Single(EntryRef {
                id: "a1".to_string(),
                content_type_id: "ct-article".to_string(),
                collection_name: "Article".to_string(),
            }),
            RelatedEntries::List(vec![
                EntryRef {
                    id: "a2".to_string(),
                    content_type_id: "ct-article".to_string(),
                    collection_name: "Article".to_string(),
                },
                EntryRef {
                    id: "p1".to_string(),
                    content_type_id: "ct-project".to_string(),
                    collection_name: "Project".to_string(),
                },
            ]),
        ]);

        let mutations = rules.mutations_for(&record, "newsTag", "news-1");

        let ids: Vec<&str> = mutations
            .iter()
            .map(|m| m.target_document_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let store = Arc::new(MockTagStore::new(&["a1"]));
        let linker = DocumentLinker::new(store.clone());

        let first = linker.apply_all(&[mutation("a1")]).await;
        let tags_after_once = store.tags_of("a1");
        let second = linker.apply_all(&[mutation("a1")]).await;
        let tags_after_twice = store.tags_of("a1");

        assert_eq!(first.failed, 0);
        assert_eq!(second.failed, 0);
        assert_eq!(tags_after_once, vec!["news-1".to_string()]);
        assert_eq!(tags_after_once, tags_after_twice);
    }

    #[tokio::test]
    async fn test_missing_target_is_counted_not_fatal() {
        let store = Arc::new(MockTagStore::new(&["a1"]));
        let linker = DocumentLinker::new(store.clone());

        let stats = linker
            .apply_all(&[mutation("a1"), mutation("missing")])
            .await;

        assert_eq!(stats.attempted, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(store.tags_of("a1"), vec!["news-1".to_string()]);
    }
}
