//! Bloom Gateway - HTTP interface for keyword bloom filters.
//!
//! # Routes
//!
//! | Route       | Params                  | Bodies                     |
//! |-------------|-------------------------|----------------------------|
//! | `/status`   | none                    | `ok\n`                     |
//! | `/bloom`    | `id`, `keyword`         | `1`, `0`, `-1`             |
//! | `/addbloom` | `id`, `keyword`, `token`| `1`, `0`, `-1`, `-2`       |
//!
//! Parameters are read from an urlencoded body and then the query string; the
//! first value for a key wins and values are decoded to raw bytes.
//!
//! `-1` means unknown filter, `-2` means the add token did not match. Both are
//! returned with HTTP 200. Panics inside a handler become a `500` for that
//! request only.
//!
//! # Middleware
//!
//! ```text
//! Request → Tracing → PanicGuard → BodyLimit → Handler
//! ```

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod params;
pub mod service;

pub use domain::{GatewayConfig, GatewayError, HttpConfig, LimitsConfig, Reply, TokenConfig};
pub use handlers::{AppState, STATUS_OK};
pub use middleware::{install_panic_hook, PanicGuardLayer, TracingLayer};
pub use params::FormValues;
pub use service::{build_router, FilterGateway};
