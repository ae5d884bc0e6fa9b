//! Model client adapters

mod http;

pub use http::HttpModelClient;
