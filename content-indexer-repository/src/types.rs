//! Request and response types for bulk write operations.

use serde_json::Value;

use crate::errors::SearchError;

/// One pending write operation in a bulk request: index the given document
/// body under the given id.
#[derive(Debug, Clone)]
pub struct BulkOperation {
    /// Document identifier.
    pub id: String,
    /// Document body.
    pub document: Value,
}

impl BulkOperation {
    /// Create an index operation.
    pub fn index(id: impl Into<String>, document: Value) -> Self {
        Self {
            id: id.into(),
            document,
        }
    }
}

/// Result of a single operation within a bulk request.
#[derive(Debug, Clone)]
pub struct BulkItemResult {
    /// Document identifier the operation addressed.
    pub id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchError>,
}

/// Summary of a bulk request containing aggregate statistics and individual
/// results, allowing callers to handle partial failures.
#[derive(Debug, Clone)]
pub struct BulkSummary {
    /// Total number of operations in the request.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each operation.
    pub results: Vec<BulkItemResult>,
}

impl BulkSummary {
    /// Summary for an empty bulk request.
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    /// Whether every operation in the request succeeded.
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    /// The cause of the first failed operation, if any.
    pub fn first_failure(&self) -> Option<&SearchError> {
        self.results
            .iter()
            .find(|item| !item.success)
            .and_then(|item| item.error.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failure() {
        let summary = BulkSummary {
            total: 2,
            succeeded: 1,
            failed: 1,
            results: vec![
                BulkItemResult {
                    id: "a".to_string(),
                    success: true,
                    error: None,
                },
                BulkItemResult {
                    id: "b".to_string(),
                    success: false,
                    error: Some(SearchError::bulk("mapper_parsing_exception")),
                },
            ],
        };
        assert!(!summary.is_complete_success());
        assert!(matches!(
            summary.first_failure(),
            Some(SearchError::BulkError(_))
        ));
    }

    #[test]
    fn test_empty_summary() {
        let summary = BulkSummary::empty();
        assert!(summary.is_complete_success());
        assert!(summary.first_failure().is_none());
    }
}
