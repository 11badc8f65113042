//! Gateway domain types: configuration and errors.

pub mod config;
pub mod error;

pub use config::{GatewayConfig, HttpConfig, LimitsConfig, TokenConfig};
pub use error::{GatewayError, Reply};
