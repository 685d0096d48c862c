//! Loader module for the content indexer pipeline.
//!
//! Accumulates transformed documents into bounded bulk writes against the
//! run's working index. A flush is synchronous: the caller awaits the full
//! batch result before feeding more records, which is the pipeline's
//! backpressure point.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::errors::PipelineError;
use content_indexer_repository::{BulkOperation, SearchEngineClient};
use content_indexer_shared::TargetDocument;

/// Configuration for the batch writer.
#[derive(Debug, Clone)]
pub struct BatchWriterConfig {
    /// Number of accumulated operations that triggers a flush.
    pub batch_size: usize,
    /// Cumulative failed operations tolerated before the run is escalated
    /// to a fatal bulk write error.
    pub failure_tolerance: usize,
}

impl Default for BatchWriterConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            failure_tolerance: 0,
        }
    }
}

/// Writer that batches documents into bulk requests against one index.
///
/// The writer does not retry failed operations; it aggregates failures and
/// escalates once they exceed the configured tolerance, leaving the
/// promote-or-abandon decision to the orchestrator.
pub struct BatchWriter {
    client: Arc<dyn SearchEngineClient>,
    index: String,
    config: BatchWriterConfig,
    pending: Vec<BulkOperation>,
    documents_indexed: usize,
    failed_operations: usize,
}

impl BatchWriter {
    /// Create a writer with default configuration.
    pub fn new(client: Arc<dyn SearchEngineClient>, index: impl Into<String>) -> Self {
        Self::with_config(client, index, BatchWriterConfig::default())
    }

    /// Create a writer with custom configuration.
    pub fn with_config(
        client: Arc<dyn SearchEngineClient>,
        index: impl Into<String>,
        config: BatchWriterConfig,
    ) -> Self {
        let batch_size = config.batch_size;
        Self {
            client,
            index: index.into(),
            config,
            pending: Vec::with_capacity(batch_size),
            documents_indexed: 0,
            failed_operations: 0,
        }
    }

    /// Queue one document, flushing when the batch bound is reached.
    pub async fn push(&mut self, document: TargetDocument) -> Result<(), PipelineError> {
        self.pending.push(BulkOperation::index(
            document.id,
            Value::Object(document.fields),
        ));

        if self.pending.len() >= self.config.batch_size {
            self.flush().await?;
        }

        Ok(())
    }

    /// Flush all pending operations.
    ///
    /// A flush with nothing accumulated is a no-op.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.pending.is_empty() {
            debug!("Nothing to flush");
            return Ok(());
        }

        let operations: Vec<BulkOperation> = self.pending.drain(..).collect();
        let count = operations.len();

        info!(count = count, "Flushing documents to search index");

        let summary = self.client.bulk_index(&self.index, &operations).await?;

        self.documents_indexed += summary.succeeded;
        self.failed_operations += summary.failed;

        if summary.failed > 0 {
            let first_failure = summary
                .first_failure()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            warn!(
                failed = summary.failed,
                first_failure = %first_failure,
                "Bulk flush had failures"
            );

            if self.failed_operations > self.config.failure_tolerance {
                return Err(PipelineError::bulk_write(format!(
                    "{} failed operations exceed tolerance of {}; first failure: {}",
                    self.failed_operations, self.config.failure_tolerance, first_failure
                )));
            }
        } else {
            debug!(count = count, "Successfully indexed batch");
        }

        Ok(())
    }

    /// Documents successfully written so far.
    pub fn documents_indexed(&self) -> usize {
        self.documents_indexed
    }

    /// Operations that failed so far.
    pub fn failed_operations(&self) -> usize {
        self.failed_operations
    }
}
