//! Dependency initialization and wiring for the content indexer.

use std::env;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::info;

use crate::IndexingError;
use content_indexer_pipeline::consumer::ContentSource;
use content_indexer_pipeline::linker::LinkRules;
use content_indexer_pipeline::orchestrator::{run_all, CollectionCrawler, CrawlerConfig};
use content_indexer_pipeline::processor::VocabularyLookup;
use content_indexer_pipeline::PipelineError;
use content_indexer_repository::opensearch::default_content_mapping;
use content_indexer_repository::{MappingProvider, OpenSearchClient, SearchEngineClient};
use content_indexer_shared::{ContentCollection, IndexGeneration, RunSummary};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default source page size.
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default bulk batch size.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Default tolerated bulk failures per run.
const DEFAULT_FAILURE_TOLERANCE: usize = 0;

/// Mapping provider serving the built-in content mapping for every
/// collection. Deployments with per-collection schemas inject their own.
struct DefaultMappingProvider;

impl MappingProvider for DefaultMappingProvider {
    fn mapping_for(&self, _collection: &ContentCollection) -> Value {
        default_content_mapping()
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// One configured crawler per collection, ready to run.
    pub crawlers: Vec<CollectionCrawler>,
    /// Shutdown channel shared by all crawlers.
    pub shutdown: broadcast::Sender<()>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// The content source and vocabulary lookup are injected by the caller;
    /// they own credentials and transport for the source APIs.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `CRAWL_PAGE_SIZE`: source page size (default: 20)
    /// - `CRAWL_BATCH_SIZE`: bulk batch size (default: 100)
    /// - `CRAWL_BULK_FAILURE_TOLERANCE`: tolerated bulk failures (default: 0)
    /// - `LINK_TARGET_CONTENT_TYPES`: comma-separated content-type ids
    ///   eligible to receive cross-reference tags (default: none)
    pub async fn new(
        collections: Vec<ContentCollection>,
        source: Arc<dyn ContentSource>,
        vocabulary: Arc<dyn VocabularyLookup>,
    ) -> Result<Self, IndexingError> {
        dotenv::dotenv().ok();

        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let page_size = env_parsed("CRAWL_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let batch_size = env_parsed("CRAWL_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let failure_tolerance =
            env_parsed("CRAWL_BULK_FAILURE_TOLERANCE", DEFAULT_FAILURE_TOLERANCE)?;
        let link_targets = link_target_content_types();

        info!(
            opensearch_url = %opensearch_url,
            page_size,
            batch_size,
            failure_tolerance,
            collections = collections.len(),
            "Initializing dependencies"
        );

        // Initialize OpenSearch client
        let search_client = OpenSearchClient::new(&opensearch_url)
            .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        // Verify OpenSearch is reachable
        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        let client: Arc<dyn SearchEngineClient> = Arc::new(search_client);
        let mappings: Arc<dyn MappingProvider> = Arc::new(DefaultMappingProvider);
        let config = CrawlerConfig {
            page_size,
            batch_size,
            failure_tolerance,
        };

        // One generation timestamp for the whole scheduled run
        let run_at = Utc::now();

        let crawlers = collections
            .into_iter()
            .map(|collection| {
                CollectionCrawler::new(
                    IndexGeneration::new(collection, run_at),
                    source.clone(),
                    vocabulary.clone(),
                    client.clone(),
                    mappings.clone(),
                    LinkRules::new(link_targets.clone()),
                    config.clone(),
                )
            })
            .collect();

        let (shutdown, _) = broadcast::channel(1);

        Ok(Self { crawlers, shutdown })
    }

    /// Run every configured crawler as an independent pipeline.
    ///
    /// Returns one result per collection, in configuration order.
    pub async fn run(self) -> Vec<Result<RunSummary, PipelineError>> {
        run_all(self.crawlers, &self.shutdown).await
    }
}

/// Read an environment variable and parse it, falling back to a default
/// when unset.
fn env_parsed<T>(key: &str, default: T) -> Result<T, IndexingError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|e| IndexingError::config(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

/// Linkable target content-type ids from `LINK_TARGET_CONTENT_TYPES`.
fn link_target_content_types() -> Vec<String> {
    env::var("LINK_TARGET_CONTENT_TYPES")
        .map(|value| {
            value
                .split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
