//! Processor module for the content indexer pipeline.
//!
//! Transforms raw source records into target documents ready for indexing.

mod normalize;
mod record_processor;
mod vocabulary;

pub use normalize::camel_case_fields;
pub use record_processor::{ProcessedRecord, RecordProcessor};
pub use vocabulary::{VocabularyKind, VocabularyLookup, UNKNOWN_LANGUAGE};
