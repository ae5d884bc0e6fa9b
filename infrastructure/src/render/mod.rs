//! Prompt renderer adapters

mod catalog;

pub use catalog::TemplateCatalog;
