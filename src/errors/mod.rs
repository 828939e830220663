//! Centralized error handling for the channel aggregator
//!
//! # Error Categories
//!
//! - **Configuration Errors**: invalid source definitions, fatal at startup
//! - **Source Errors**: worker lifecycle failures, upstream HTTP and parse issues
//! - **I/O Errors**: app-data cache directory and file access
//!
//! # Usage
//!
//! ```rust
//! use channel_aggregator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("missing url"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
