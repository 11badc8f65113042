//! Error types for filter loading and configuration

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while configuring or loading filters
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("No dictionary sources configured")]
    NoSources,

    #[error("Duplicate filter name: {name}")]
    DuplicateFilter { name: String },

    #[error("Invalid dictionary source path: {path:?}")]
    InvalidSource { path: String },

    #[error("Failed to open dictionary for filter {name}: {source}")]
    SourceOpen {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read dictionary for filter {name}: {source}")]
    SourceRead {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Loader exited without reporting: received {received} of {expected} results")]
    LoaderLost { expected: usize, received: usize },

    #[error("Filter loading did not finish within {limit:?}")]
    LoadTimeout { limit: Duration },

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),
}
