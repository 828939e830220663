//! Error type definitions for the channel aggregator
//!
//! The hierarchy mirrors how failures are handled: configuration errors abort
//! startup, lifecycle errors are handed back to whoever called start/stop,
//! and refresh errors never leave the worker that produced them.

use std::fmt;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Filesystem errors (app-data cache)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Which lifecycle operation a worker failed to complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOperation {
    Start,
    Stop,
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleOperation::Start => f.write_str("start"),
            LifecycleOperation::Stop => f.write_str("stop"),
        }
    }
}

/// Source handling specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// A worker's start or stop failed
    #[error("Source '{name}' failed to {operation}: {source}")]
    Lifecycle {
        name: String,
        operation: LifecycleOperation,
        #[source]
        source: Box<AppError>,
    },

    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Parsing errors for source data
    #[error("Parse error: {source_type} - {message}")]
    ParseError { source_type: String, message: String },

    /// HTTP errors from external sources
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wrap a worker failure with the source name and operation it belongs to
    pub fn lifecycle<S: Into<String>>(name: S, operation: LifecycleOperation, source: AppError) -> Self {
        Self::Source(SourceError::Lifecycle {
            name: name.into(),
            operation,
            source: Box::new(source),
        })
    }

    /// Whether this is a fatal configuration problem
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration { .. })
    }
}

impl SourceError {
    /// Create a parse error for a given source type
    pub fn parse<T: Into<String>, M: Into<String>>(source_type: T, message: M) -> Self {
        Self::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        }
    }
}
