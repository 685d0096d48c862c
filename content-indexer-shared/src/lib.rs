//! # Content Indexer Shared
//!
//! Shared types and data structures for the content indexer system.
//!
//! This crate defines the vocabulary spoken by every other crate in the
//! workspace: content collections, source records, target documents, tag
//! mutations, index generations and run summaries, plus the naming rules
//! that derive index and field names from collection names.

pub mod collection;
pub mod document;
pub mod generation;
pub mod naming;
pub mod summary;

pub use collection::{CollectionKind, ContentCollection};
pub use document::{EntryRef, RelatedEntries, SourceRecord, TagMutation, TargetDocument};
pub use generation::IndexGeneration;
pub use summary::{PromotionOutcome, RunSummary};
