//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod event_sink;
pub mod memory_store;
pub mod model_client;
pub mod prompt_renderer;
