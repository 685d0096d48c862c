//! Interface definitions for the search engine client.
//!
//! This module defines the abstract `SearchEngineClient` trait that allows
//! for dependency injection and swappable search backend implementations,
//! and the `MappingProvider` collaborator supplying per-collection schemas.

mod mapping_provider;
mod search_engine_client;

pub use mapping_provider::MappingProvider;
pub use search_engine_client::SearchEngineClient;
