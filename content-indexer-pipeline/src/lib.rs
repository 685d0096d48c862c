//! # Content Indexer Pipeline
//!
//! This crate provides the pipeline components for crawling paginated
//! content sources and reindexing them into the search engine with a
//! zero-downtime alias swap.
//!
//! ## Architecture
//!
//! One crawl run per collection flows through:
//!
//! 1. **Consumer**: pulls fixed-size pages from the content source
//! 2. **Processor**: transforms records into target documents
//! 3. **Linker**: propagates cross-content-type tags to other indices
//! 4. **Loader**: accumulates documents into bounded bulk writes
//! 5. **Lifecycle**: owns the working index and the alias-swap protocol
//! 6. **Orchestrator**: wires the stages and decides on promotion

pub mod consumer;
pub mod errors;
pub mod lifecycle;
pub mod linker;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use errors::PipelineError;
