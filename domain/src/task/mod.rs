//! Task input and categorization

pub mod category;
pub mod input;
