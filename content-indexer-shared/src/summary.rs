//! Run summaries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::ContentCollection;

/// Outcome of the promotion phase of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionOutcome {
    /// The serving alias was repointed to the working index; the listed
    /// superseded indices were deleted.
    Promoted {
        working_index: String,
        deleted_indices: Vec<String>,
    },
    /// The run terminated without touching the alias. The working index is
    /// left in place for post-mortem inspection.
    Abandoned { reason: String },
}

/// Summary of one crawl run, emitted whether the run succeeded or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique identifier of this run.
    pub run_id: Uuid,
    /// The collection that was crawled.
    pub collection: ContentCollection,
    /// Number of pages fetched from the source.
    pub pages_fetched: usize,
    /// Total records received from the source.
    pub records_fetched: usize,
    /// Records skipped because their transformation failed.
    pub records_skipped: usize,
    /// Documents successfully written to the working index.
    pub documents_indexed: usize,
    /// Cross-reference tag mutations attempted.
    pub tag_mutations_attempted: usize,
    /// Cross-reference tag mutations that failed.
    pub tag_mutations_failed: usize,
    /// What happened at promotion time.
    pub promotion: PromotionOutcome,
}

impl RunSummary {
    /// Whether this run ended with a promoted index.
    pub fn is_promoted(&self) -> bool {
        matches!(self.promotion, PromotionOutcome::Promoted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_promoted() {
        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            collection: ContentCollection::cms("ct-news", "News"),
            pages_fetched: 3,
            records_fetched: 45,
            records_skipped: 0,
            documents_indexed: 45,
            tag_mutations_attempted: 0,
            tag_mutations_failed: 0,
            promotion: PromotionOutcome::Promoted {
                working_index: "news1234".to_string(),
                deleted_indices: vec!["news1000".to_string()],
            },
        };
        assert!(summary.is_promoted());

        let abandoned = RunSummary {
            promotion: PromotionOutcome::Abandoned {
                reason: "source fetch failed".to_string(),
            },
            ..summary
        };
        assert!(!abandoned.is_promoted());
    }
}
