//! Configuration loading

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileEventsConfig, FileGuardrailConfig,
    FileGuardrailsConfig, FileMemoryConfig, FileModelConfig, FilePipelineConfig,
    FileReviewConfig, FileReviewerConfig,
};
pub use loader::ConfigLoader;
