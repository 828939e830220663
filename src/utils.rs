//! Utility modules shared by the source workers
//!
//! - `utils::http_client` for fetching upstream content
//! - `utils::url` for URL validation and log-safe rendering

pub mod http_client;
pub mod url;

pub use self::http_client::{HttpFetcher, TextFetcher};
pub use self::url::UrlUtils;
