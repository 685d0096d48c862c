//! Orchestrator module for the content indexer pipeline.
//!
//! Drives one full crawl run per collection: create the working index,
//! stream pages through the processor, linker and batch writer, then
//! promote on full-stream success. On any fatal error the working index is
//! left unpromoted and the serving alias stays untouched.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::consumer::{ContentSource, PageReader, StreamMessage, PAGE_CHANNEL_CAPACITY};
use crate::errors::PipelineError;
use crate::lifecycle::IndexLifecycle;
use crate::linker::{DocumentLinker, LinkRules, LinkStats};
use crate::loader::{BatchWriter, BatchWriterConfig};
use crate::processor::{RecordProcessor, VocabularyLookup};
use content_indexer_repository::{MappingProvider, SearchEngineClient};
use content_indexer_shared::{
    ContentCollection, IndexGeneration, PromotionOutcome, RunSummary,
};

/// Configuration for one collection crawler.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Page size requested from the content source.
    pub page_size: u32,
    /// Bulk batch size; also the pipeline's backpressure bound.
    pub batch_size: usize,
    /// Failed bulk operations tolerated before the run turns fatal.
    pub failure_tolerance: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            batch_size: 100,
            failure_tolerance: 0,
        }
    }
}

/// Crawler that performs one full reindexing run for one collection.
///
/// Distinct collections run as fully independent pipelines; the only shared
/// state is the search engine client.
pub struct CollectionCrawler {
    collection: ContentCollection,
    source: Arc<dyn ContentSource>,
    client: Arc<dyn SearchEngineClient>,
    processor: RecordProcessor,
    linker: DocumentLinker,
    lifecycle: IndexLifecycle,
    config: CrawlerConfig,
}

impl CollectionCrawler {
    /// Wire a crawler for one generation.
    pub fn new(
        generation: IndexGeneration,
        source: Arc<dyn ContentSource>,
        vocabulary: Arc<dyn VocabularyLookup>,
        client: Arc<dyn SearchEngineClient>,
        mappings: Arc<dyn MappingProvider>,
        link_rules: LinkRules,
        config: CrawlerConfig,
    ) -> Self {
        let collection = generation.collection.clone();
        let processor = RecordProcessor::new(collection.clone(), vocabulary, link_rules);
        let linker = DocumentLinker::new(client.clone());
        let lifecycle = IndexLifecycle::new(client.clone(), mappings, generation);

        Self {
            collection,
            source,
            client,
            processor,
            linker,
            lifecycle,
            config,
        }
    }

    /// Run the crawl to completion.
    ///
    /// Exactly one bulk flush is outstanding at any time; page production
    /// proceeds concurrently up to the one-page prefetch bound.
    #[instrument(skip(self, shutdown), fields(collection = %self.collection.name))]
    pub async fn run(
        mut self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<RunSummary, PipelineError> {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, "Starting crawl run");

        self.lifecycle.create_working_index().await?;
        self.lifecycle.begin_populating()?;

        let (tx, mut rx) = mpsc::channel(PAGE_CHANNEL_CAPACITY);
        let reader = PageReader::new(
            self.source.clone(),
            self.collection.id.clone(),
            self.config.page_size,
        );
        let reader_shutdown = shutdown.resubscribe();
        let reader_handle = tokio::spawn(async move { reader.run(tx, reader_shutdown).await });

        let mut writer = BatchWriter::with_config(
            self.client.clone(),
            self.lifecycle.working_index().to_string(),
            BatchWriterConfig {
                batch_size: self.config.batch_size,
                failure_tolerance: self.config.failure_tolerance,
            },
        );

        let mut pages_fetched = 0;
        let mut records_fetched = 0;
        let mut records_skipped = 0;
        let mut link_stats = LinkStats::default();
        let mut failure: Option<PipelineError> = None;

        'stream: loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Crawl received shutdown signal");
                    failure = Some(PipelineError::Cancelled);
                    break 'stream;
                }
                msg = rx.recv() => match msg {
                    Some(StreamMessage::Page(page)) => {
                        pages_fetched += 1;
                        for record in page.records {
                            records_fetched += 1;
                            match self.processor.process(&record) {
                                Ok(processed) => {
                                    let stats = self.linker.apply_all(&processed.mutations).await;
                                    link_stats.attempted += stats.attempted;
                                    link_stats.failed += stats.failed;

                                    if let Err(e) = writer.push(processed.document).await {
                                        failure = Some(e);
                                        break 'stream;
                                    }
                                }
                                Err(e) => {
                                    warn!(
                                        record_id = %record.id,
                                        error = %e,
                                        "Skipping record that failed transformation"
                                    );
                                    records_skipped += 1;
                                }
                            }
                        }
                    }
                    Some(StreamMessage::Error { cursor, message }) => {
                        failure = Some(PipelineError::source_fetch(cursor, message));
                        break 'stream;
                    }
                    Some(StreamMessage::End) | None => break 'stream,
                }
            }
        }

        drop(rx);

        if failure.is_none() {
            if let Err(e) = writer.flush().await {
                failure = Some(e);
            }
        }

        let _ = reader_handle.await;

        if let Some(error) = failure {
            if matches!(error, PipelineError::Cancelled) {
                self.lifecycle.abandon();
            } else {
                self.lifecycle.mark_failed();
            }
            warn!(
                run_id = %run_id,
                pages_fetched,
                records_fetched,
                records_skipped,
                documents_indexed = writer.documents_indexed(),
                tag_mutations_attempted = link_stats.attempted,
                tag_mutations_failed = link_stats.failed,
                error = %error,
                "Crawl run failed, serving alias untouched"
            );
            return Err(error);
        }

        self.lifecycle.mark_eligible()?;
        let working_index = self.lifecycle.working_index().to_string();
        let deleted_indices = self.lifecycle.promote().await?;

        let summary = RunSummary {
            run_id,
            collection: self.collection,
            pages_fetched,
            records_fetched,
            records_skipped,
            documents_indexed: writer.documents_indexed(),
            tag_mutations_attempted: link_stats.attempted,
            tag_mutations_failed: link_stats.failed,
            promotion: PromotionOutcome::Promoted {
                working_index,
                deleted_indices,
            },
        };

        info!(
            run_id = %run_id,
            pages_fetched = summary.pages_fetched,
            documents_indexed = summary.documents_indexed,
            records_skipped = summary.records_skipped,
            tag_mutations_attempted = summary.tag_mutations_attempted,
            tag_mutations_failed = summary.tag_mutations_failed,
            "Crawl run complete"
        );

        Ok(summary)
    }
}

/// Run several collection crawlers as independent concurrent pipelines.
///
/// Each crawler gets its own subscription to the shutdown channel. Results
/// are returned in crawler order.
pub async fn run_all(
    crawlers: Vec<CollectionCrawler>,
    shutdown: &broadcast::Sender<()>,
) -> Vec<Result<RunSummary, PipelineError>> {
    let handles: Vec<_> = crawlers
        .into_iter()
        .map(|crawler| {
            let shutdown_rx = shutdown.subscribe();
            tokio::spawn(crawler.run(shutdown_rx))
        })
        .collect();

    futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| {
            joined.unwrap_or_else(|e| Err(PipelineError::channel(format!("crawler task failed: {}", e))))
        })
        .collect()
}
