//! Gateway errors and wire replies.
//!
//! Client mistakes (unknown filter, bad token) are not errors on the wire:
//! they are sentinel bodies with HTTP 200, which existing clients parse.

use std::net::SocketAddr;

use axum::response::{IntoResponse, Response};

/// Plain-text reply bodies understood by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Keyword present / newly inserted
    Yes,
    /// Keyword absent / already present
    No,
    /// No filter registered under the requested id
    UnknownFilter,
    /// Add-keyword token did not match
    BadToken,
}

impl Reply {
    /// Wire body for this reply
    pub fn as_str(self) -> &'static str {
        match self {
            Reply::Yes => "1",
            Reply::No => "0",
            Reply::UnknownFilter => "-1",
            Reply::BadToken => "-2",
        }
    }
}

impl From<bool> for Reply {
    fn from(value: bool) -> Self {
        if value {
            Reply::Yes
        } else {
            Reply::No
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        self.as_str().into_response()
    }
}

/// Gateway-level errors (startup and listener)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Listener failed while serving
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
