//! Pipeline use cases

pub mod classify;
pub mod guardrail;
pub mod review_panel;
pub mod run_pipeline;
