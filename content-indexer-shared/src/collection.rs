//! Content collection definitions.

use serde::{Deserialize, Serialize};

use crate::naming::{field_name_format, index_alias_name};

/// The flavor of a content collection, which decides the schema-specific
/// replacements applied during transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionKind {
    /// A content type fetched from the headless CMS.
    Cms,
    /// The literature feed fetched from the reference-manager API.
    Literature,
}

/// One logical content type being crawled.
///
/// Defined by configuration and read-only for the duration of a run. All
/// index, alias and field names are derived from `name` via the rules in
/// [`crate::naming`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCollection {
    /// Stable content-type identifier in the source system.
    pub id: String,
    /// Human-readable collection name, e.g. "News" or "Data Use".
    pub name: String,
    /// The flavor of this collection.
    pub kind: CollectionKind,
}

impl ContentCollection {
    /// Define a CMS-backed collection.
    pub fn cms(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: CollectionKind::Cms,
        }
    }

    /// Define the literature collection.
    pub fn literature(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: CollectionKind::Literature,
        }
    }

    /// The serving alias read traffic queries for this collection.
    pub fn alias(&self) -> String {
        index_alias_name(&self.name)
    }

    /// The `contentType` value stamped on every document of this collection.
    ///
    /// Literature documents carry the fixed value `literature`; CMS
    /// collections use the camelCased collection name.
    pub fn content_type_value(&self) -> String {
        match self.kind {
            CollectionKind::Literature => "literature".to_string(),
            CollectionKind::Cms => field_name_format(&self.name),
        }
    }

    /// The field under which this collection tags related documents in
    /// other collections' indices, e.g. "newsTag" for the "News" collection.
    pub fn tag_field(&self) -> String {
        format!("{}Tag", self.content_type_value())
    }
}
