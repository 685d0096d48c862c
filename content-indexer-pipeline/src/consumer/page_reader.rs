//! Page reader implementation.
//!
//! Drives a [`ContentSource`] lazily: one page is fetched, handed to the
//! pipeline, and only then is the next page requested. The bounded channel
//! between reader and pipeline keeps the reader at most one page ahead,
//! which protects rate limits on the source API.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, warn};

use crate::consumer::messages::StreamMessage;
use crate::consumer::source_api::ContentSource;
use crate::errors::PipelineError;

/// Capacity of the page channel. One in-flight page plus the one being
/// processed is the prefetch bound required by the source API contract.
pub const PAGE_CHANNEL_CAPACITY: usize = 1;

/// Reader that pulls pages of source records for one collection.
pub struct PageReader {
    source: Arc<dyn ContentSource>,
    collection_id: String,
    page_size: u32,
}

impl PageReader {
    /// Create a new page reader for a collection.
    pub fn new(source: Arc<dyn ContentSource>, collection_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            source,
            collection_id: collection_id.into(),
            page_size,
        }
    }

    /// Fetch pages until the source is exhausted, sending each page through
    /// the channel.
    ///
    /// The sequence is finite and non-restartable: a fetch error emits
    /// [`StreamMessage::Error`] with the failing cursor and terminates the
    /// stream. Pages are never skipped.
    #[instrument(skip(self, sender, shutdown), fields(collection_id = %self.collection_id))]
    pub async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), PipelineError> {
        let mut cursor: Option<String> = None;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Page reader received shutdown signal");
                    break;
                }
                page = self.source.fetch_page(&self.collection_id, cursor.as_deref(), self.page_size) => {
                    match page {
                        Ok(page) => {
                            let next_cursor = page.next_cursor.clone();
                            debug!(
                                records = page.records.len(),
                                next_cursor = ?next_cursor,
                                "Fetched page"
                            );

                            sender
                                .send(StreamMessage::Page(page))
                                .await
                                .map_err(|e| PipelineError::channel(e.to_string()))?;

                            match next_cursor {
                                Some(next) => cursor = Some(next),
                                None => {
                                    let _ = sender.send(StreamMessage::End).await;
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            warn!(cursor = ?cursor, error = %e, "Page fetch failed, aborting stream");
                            let _ = sender
                                .send(StreamMessage::Error {
                                    cursor: cursor.clone(),
                                    message: e.to_string(),
                                })
                                .await;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::source_api::{SourceError, SourcePage};
    use async_trait::async_trait;
    use content_indexer_shared::SourceRecord;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source serving a fixed number of pages, failing at an optional page.
    struct ScriptedSource {
        pages: usize,
        records_per_page: usize,
        fail_at_page: Option<usize>,
        fetches: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(pages: usize, records_per_page: usize) -> Self {
            Self {
                pages,
                records_per_page,
                fail_at_page: None,
                fetches: AtomicUsize::new(0),
            }
        }

        fn failing_at(mut self, page: usize) -> Self {
            self.fail_at_page = Some(page);
            self
        }
    }

    #[async_trait]
    impl ContentSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _collection_id: &str,
            cursor: Option<&str>,
            _page_size: u32,
        ) -> Result<SourcePage, SourceError> {
            let page_number: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            self.fetches.fetch_add(1, Ordering::SeqCst);

            if self.fail_at_page == Some(page_number) {
                return Err(SourceError::request("boom"));
            }

            let records = (0..self.records_per_page)
                .map(|i| {
                    SourceRecord::new(
                        format!("rec-{}-{}", page_number, i),
                        "ct-news",
                        json!({"title": "t"}),
                    )
                })
                .collect();

            let next_cursor = if page_number + 1 < self.pages {
                Some((page_number + 1).to_string())
            } else {
                None
            };

            Ok(SourcePage {
                records,
                next_cursor,
            })
        }
    }

    async fn drain(mut rx: mpsc::Receiver<StreamMessage>) -> Vec<StreamMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            messages.push(msg);
        }
        messages
    }

    #[tokio::test]
    async fn test_reads_all_pages_then_ends() {
        let source = Arc::new(ScriptedSource::new(3, 20));
        let reader = PageReader::new(source.clone(), "ct-news", 20);
        let (tx, rx) = mpsc::channel(PAGE_CHANNEL_CAPACITY);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move { drain(rx).await });
        reader.run(tx, shutdown_rx).await.unwrap();
        let messages = handle.await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
        assert_eq!(messages.len(), 4);
        assert!(matches!(messages[0], StreamMessage::Page(_)));
        assert!(matches!(messages[3], StreamMessage::End));
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_with_cursor() {
        let source = Arc::new(ScriptedSource::new(3, 20).failing_at(1));
        let reader = PageReader::new(source, "ct-news", 20);
        let (tx, rx) = mpsc::channel(PAGE_CHANNEL_CAPACITY);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move { drain(rx).await });
        reader.run(tx, shutdown_rx).await.unwrap();
        let messages = handle.await.unwrap();

        // One good page, then the error; never an End
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], StreamMessage::Page(_)));
        match &messages[1] {
            StreamMessage::Error { cursor, .. } => assert_eq!(cursor.as_deref(), Some("1")),
            other => panic!("expected error message, got {:?}", other),
        }
    }
}
