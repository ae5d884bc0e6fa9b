//! Infrastructure layer for redraft
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer, including configuration file loading.

pub mod config;
pub mod events;
pub mod memory;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, FileGuardrailConfig, FileReviewerConfig};
pub use events::{JsonlEventSink, TracingEventSink};
pub use memory::KeywordMemoryStore;
pub use model::HttpModelClient;
pub use render::TemplateCatalog;
