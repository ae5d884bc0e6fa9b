//! Event sink adapters

mod jsonl_sink;
mod tracing_sink;

pub use jsonl_sink::JsonlEventSink;
pub use tracing_sink::TracingEventSink;
