//! Revision round history and stopping rules

pub mod policy;
pub mod quality;
pub mod record;
