//! Memory store adapters

mod keyword;

pub use keyword::KeywordMemoryStore;
