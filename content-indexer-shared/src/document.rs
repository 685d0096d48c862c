//! Source records, target documents and tag mutations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A reference to an entry related to a source record, fetched inline
/// (denormalized) so the linker never needs a second round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    /// Identifier of the related entry in the source system.
    pub id: String,
    /// Content-type identifier of the related entry.
    pub content_type_id: String,
    /// Collection name of the related entry, used to derive its serving alias.
    pub collection_name: String,
}

/// Related entries attached to a source record.
///
/// The source API returns either a single entry or a list of localized
/// entries for a relation field; both shapes are modeled explicitly rather
/// than inspected at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelatedEntries {
    /// A single related entry.
    Single(EntryRef),
    /// A list of related entries.
    List(Vec<EntryRef>),
}

impl RelatedEntries {
    /// Iterate over the contained entry references.
    pub fn iter(&self) -> impl Iterator<Item = &EntryRef> {
        match self {
            RelatedEntries::Single(entry) => std::slice::from_ref(entry).iter(),
            RelatedEntries::List(entries) => entries.iter(),
        }
    }
}

/// One raw unit fetched from a content source.
///
/// The field payload is opaque to the reader; only the transformer assigns
/// meaning to individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Stable record identifier in the source system.
    pub id: String,
    /// Content-type identifier of the record itself.
    pub content_type_id: String,
    /// Raw field payload as returned by the source API.
    pub fields: Value,
    /// Related entries fetched inline with the record.
    #[serde(default)]
    pub related: Vec<RelatedEntries>,
}

impl SourceRecord {
    /// Create a record with no related entries.
    pub fn new(id: impl Into<String>, content_type_id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            content_type_id: content_type_id.into(),
            fields,
            related: Vec::new(),
        }
    }

    /// Attach related entries to the record.
    pub fn with_related(mut self, related: Vec<RelatedEntries>) -> Self {
        self.related = related;
        self
    }
}

/// The transformed form of a [`SourceRecord`], ready for indexing.
///
/// Always carries a `contentType` field identifying its origin collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDocument {
    /// Document identifier, taken from the source record.
    pub id: String,
    /// Field name to value mapping written to the index.
    pub fields: Map<String, Value>,
}

impl TargetDocument {
    /// The `contentType` value stamped on this document, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.fields.get("contentType").and_then(Value::as_str)
    }
}

/// An idempotent request to append a tag value to a list-valued field on one
/// document in a different collection's serving index.
///
/// Applying the same mutation twice is a no-op after the first application
/// (set semantics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMutation {
    /// Serving alias of the target collection.
    pub target_alias: String,
    /// Identifier of the document to tag.
    pub target_document_id: String,
    /// List-valued field receiving the tag, e.g. "newsTag".
    pub tag_field: String,
    /// The tag value: the source record's own identifier.
    pub tag_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_related_entries_iter() {
        let single = RelatedEntries::Single(EntryRef {
            id: "e1".to_string(),
            content_type_id: "ct-article".to_string(),
            collection_name: "Article".to_string(),
        });
        assert_eq!(single.iter().count(), 1);

        let list = RelatedEntries::List(vec![
            EntryRef {
                id: "e1".to_string(),
                content_type_id: "ct-article".to_string(),
                collection_name: "Article".to_string(),
            },
            EntryRef {
                id: "e2".to_string(),
                content_type_id: "ct-news".to_string(),
                collection_name: "News".to_string(),
            },
        ]);
        assert_eq!(list.iter().count(), 2);
    }

    #[test]
    fn test_target_document_content_type() {
        let mut fields = Map::new();
        fields.insert("contentType".to_string(), json!("news"));
        let doc = TargetDocument {
            id: "r1".to_string(),
            fields,
        };
        assert_eq!(doc.content_type(), Some("news"));
    }
}
