//! Index generation tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::ContentCollection;

/// A generation token identifying one run's working index.
///
/// The token carries an explicit run timestamp instead of reading the wall
/// clock at naming time, so index-name collision and ordering behavior can
/// be exercised deterministically by injecting the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexGeneration {
    /// The collection this generation belongs to.
    pub collection: ContentCollection,
    /// When the run producing this generation started.
    pub run_at: DateTime<Utc>,
}

impl IndexGeneration {
    /// Create a generation token for a run starting at `run_at`.
    pub fn new(collection: ContentCollection, run_at: DateTime<Utc>) -> Self {
        Self { collection, run_at }
    }

    /// The unique, disposable working index name for this generation:
    /// the collection alias suffixed with the run timestamp in milliseconds.
    pub fn working_index_name(&self) -> String {
        format!("{}{}", self.collection.alias(), self.run_at.timestamp_millis())
    }

    /// The serving alias this generation is promoted to.
    pub fn alias(&self) -> String {
        self.collection.alias()
    }
}
