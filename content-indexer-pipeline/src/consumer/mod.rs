//! Consumer module for the content indexer pipeline.
//!
//! Pulls fixed-size pages of source records from a content source and feeds
//! them into the pipeline.

mod messages;
mod page_reader;
mod source_api;

pub use messages::StreamMessage;
pub use page_reader::{PageReader, PAGE_CHANNEL_CAPACITY};
pub use source_api::{ContentSource, SourceError, SourcePage};
