//! HTTP handlers: status, test-membership and add-keyword.
//!
//! Parameters come from `FormValues`: body then query, first value wins, a
//! missing field is empty. Keywords are raw bytes end to end.

use std::sync::Arc;

use axum::extract::State;
use bloom_filters::{FilterRegistry, TokenValidator};
use tracing::{debug, warn};

use crate::domain::Reply;
use crate::params::FormValues;

/// Body returned by the liveness check
pub const STATUS_OK: &str = "ok\n";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FilterRegistry>,
    pub tokens: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(registry: Arc<FilterRegistry>, tokens: TokenValidator) -> Self {
        Self {
            registry,
            tokens: Arc::new(tokens),
        }
    }

    /// The registered filter name matching `id`, if any
    fn filter<'a>(&self, id: &'a [u8]) -> Option<&'a str> {
        std::str::from_utf8(id)
            .ok()
            .filter(|name| self.registry.contains_filter(name))
    }
}

/// `GET /status`
pub async fn status() -> &'static str {
    STATUS_OK
}

/// `GET /bloom?id=<name>&keyword=<kw>`
///
/// `1` if the keyword may be present, `0` if it is definitely absent,
/// `-1` if no filter is registered under `id`.
pub async fn test_membership(State(state): State<AppState>, params: FormValues) -> Reply {
    let id = params.get("id");
    let Some(name) = state.filter(id) else {
        debug!(filter = %String::from_utf8_lossy(id), "Test against unknown filter");
        return Reply::UnknownFilter;
    };

    match state.registry.test(name, params.get("keyword")) {
        Some(present) => Reply::from(present),
        None => Reply::UnknownFilter,
    }
}

/// `GET /addbloom?id=<name>&keyword=<kw>&token=<tok>`
///
/// `1` if the keyword was newly inserted, `0` if it was already present,
/// `-1` for an unknown filter (token not checked), `-2` for a bad token.
pub async fn add_keyword(State(state): State<AppState>, params: FormValues) -> Reply {
    let id = params.get("id");
    let Some(name) = state.filter(id) else {
        debug!(filter = %String::from_utf8_lossy(id), "Add against unknown filter");
        return Reply::UnknownFilter;
    };

    let keyword = params.get("keyword");
    if !state.tokens.validate(name, keyword, params.get("token")) {
        warn!(filter = %name, "Add rejected: invalid token");
        return Reply::BadToken;
    }

    match state.registry.add(name, keyword) {
        Some(inserted) => {
            debug!(filter = %name, inserted, "Keyword added");
            Reply::from(inserted)
        }
        None => Reply::UnknownFilter,
    }
}
