//! Default index settings and mappings for content indices.
//!
//! Concrete deployments usually ship collection-specific mappings through
//! their own `MappingProvider`; this default covers the fields every
//! transformed document can carry.

use serde_json::{json, Value};

/// Get the default settings and mappings for a content index.
///
/// Dynamic mapping stays enabled because CMS payloads carry
/// collection-specific fields; the explicit properties pin the types of the
/// fields the pipeline itself produces, including the `*Tag` fields written
/// by cross-reference linking.
pub fn default_content_mapping() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic_templates": [
                {
                    "tags": {
                        "match": "*Tag",
                        "mapping": { "type": "keyword" }
                    }
                }
            ],
            "properties": {
                "contentType": { "type": "keyword" },
                "literatureType": { "type": "keyword" },
                "title": { "type": "text" },
                "summary": { "type": "text" },
                "language": { "type": "keyword" },
                "countriesOfResearcher": { "type": "keyword" },
                "countriesOfCoverage": { "type": "keyword" },
                "gbifRegion": { "type": "keyword" },
                "gbifDOI": { "type": "keyword" },
                "createdAt": { "type": "date" },
                "updatedAt": { "type": "date" }
            }
        }
    })
}
