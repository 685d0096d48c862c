//! Error types for the content indexer repository.

mod search_error;

pub use search_error::SearchError;
