//! Index lifecycle manager for the content indexer pipeline.
//!
//! Owns one run's working index and the alias-swap-and-collect protocol
//! that promotes it to serving status. The ordering invariant is absolute:
//! stale indices are deleted only after the alias retarget has completed,
//! so a reader never observes an alias pointing at nothing.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::PipelineError;
use content_indexer_repository::{MappingProvider, SearchEngineClient};
use content_indexer_shared::naming::CONTENT_ALIAS;
use content_indexer_shared::IndexGeneration;

/// States of one run's index lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NotStarted,
    WorkingIndexCreated,
    Populating,
    PromotionEligible,
    Failed,
    Promoted,
    Abandoned,
}

/// Manager for the working index of one crawl run.
pub struct IndexLifecycle {
    client: Arc<dyn SearchEngineClient>,
    mappings: Arc<dyn MappingProvider>,
    generation: IndexGeneration,
    working_index: String,
    alias: String,
    state: LifecycleState,
}

impl IndexLifecycle {
    /// Create a lifecycle manager for one generation.
    pub fn new(
        client: Arc<dyn SearchEngineClient>,
        mappings: Arc<dyn MappingProvider>,
        generation: IndexGeneration,
    ) -> Self {
        let working_index = generation.working_index_name();
        let alias = generation.alias();
        Self {
            client,
            mappings,
            generation,
            working_index,
            alias,
            state: LifecycleState::NotStarted,
        }
    }

    /// Name of this run's working index.
    pub fn working_index(&self) -> &str {
        &self.working_index
    }

    /// Serving alias of the collection.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Allocate the working index with the collection's mapping.
    ///
    /// If an index of the exact generated name already exists (a
    /// clock-collision re-run), it is deleted first.
    #[instrument(skip(self), fields(index = %self.working_index))]
    pub async fn create_working_index(&mut self) -> Result<(), PipelineError> {
        self.expect_state(LifecycleState::NotStarted, "create working index")?;

        if self.client.index_exists(&self.working_index).await? {
            warn!("Working index name already exists, recreating");
            self.client.delete_index(&self.working_index).await?;
        }

        let mapping = self.mappings.mapping_for(&self.generation.collection);
        self.client
            .create_index(&self.working_index, &mapping)
            .await?;

        self.state = LifecycleState::WorkingIndexCreated;
        Ok(())
    }

    /// Enter the populating phase. No external visibility change.
    pub fn begin_populating(&mut self) -> Result<(), PipelineError> {
        self.expect_state(LifecycleState::WorkingIndexCreated, "begin populating")?;
        self.state = LifecycleState::Populating;
        Ok(())
    }

    /// The full stream completed; the run may promote.
    pub fn mark_eligible(&mut self) -> Result<(), PipelineError> {
        self.expect_state(LifecycleState::Populating, "mark eligible")?;
        self.state = LifecycleState::PromotionEligible;
        Ok(())
    }

    /// The run hit an unrecoverable error. The working index is left in
    /// place for post-mortem inspection; no alias change occurs.
    pub fn mark_failed(&mut self) {
        warn!(
            index = %self.working_index,
            state = ?self.state,
            "Run failed, leaving working index unpromoted"
        );
        self.state = LifecycleState::Failed;
    }

    /// Terminate without promotion after a failure or cancellation.
    pub fn abandon(&mut self) {
        self.state = LifecycleState::Abandoned;
    }

    /// Atomically promote the working index to serving status.
    ///
    /// Repoints the collection's serving alias and the shared content alias
    /// to the working index, then deletes every index still attached to the
    /// old alias binding except the newly promoted one. Returns the deleted
    /// index names.
    #[instrument(skip(self), fields(index = %self.working_index, alias = %self.alias))]
    pub async fn promote(&mut self) -> Result<Vec<String>, PipelineError> {
        self.expect_state(LifecycleState::PromotionEligible, "promote")?;

        // Alias retarget must complete before any deletion; reordering
        // would open a window where the alias points to nothing.
        self.client
            .put_alias(&self.working_index, &self.alias)
            .await
            .map_err(|e| PipelineError::promotion(e.to_string()))?;
        self.client
            .put_alias(&self.working_index, CONTENT_ALIAS)
            .await
            .map_err(|e| PipelineError::promotion(e.to_string()))?;

        let aliased = self
            .client
            .indices_for_alias(&self.alias)
            .await
            .map_err(|e| PipelineError::promotion(e.to_string()))?;

        let mut deleted = Vec::new();
        for stale in aliased {
            if stale != self.working_index {
                self.client
                    .delete_index(&stale)
                    .await
                    .map_err(|e| PipelineError::promotion(e.to_string()))?;
                deleted.push(stale);
            }
        }

        info!(deleted = ?deleted, "Promoted working index");
        self.state = LifecycleState::Promoted;
        Ok(deleted)
    }

    fn expect_state(
        &self,
        expected: LifecycleState,
        operation: &str,
    ) -> Result<(), PipelineError> {
        if self.state != expected {
            return Err(PipelineError::promotion(format!(
                "cannot {} from state {:?}",
                operation, self.state
            )));
        }
        Ok(())
    }
}
