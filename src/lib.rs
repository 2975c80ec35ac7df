//! Model Curator - LLM catalog curation tool
//!
//! Discovers model metadata from the Hugging Face Hub, normalizes it into
//! the application's catalog schema and maintains a local JSON catalog file
//! with validation and deduplication.

pub mod assemble;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod discover;
pub mod estimate;
pub mod extract;
pub mod hub;
pub mod schema;
pub mod validate;
pub mod variants;

pub use catalog::{CatalogStore, DuplicatePolicy};
pub use config::CuratorConfig;
pub use discover::{SearchCapture, SearchHit};
pub use hub::{Category, HubClient, HubError, HubModel, ModelHub, RepoFile, SearchCriteria, SizeRange};
pub use schema::{ModelRecord, Variant};
