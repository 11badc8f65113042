//! Gateway configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use bloom_filters::LEGACY_SALT;

use super::error::GatewayError;

/// Complete gateway configuration
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// HTTP listener configuration
    pub http: HttpConfig,
    /// Add-keyword token configuration
    pub token: TokenConfig,
    /// Request limits
    pub limits: LimitsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.token.salt.is_empty() {
            return Err(GatewayError::Config("token salt must not be empty".into()));
        }
        if self.limits.max_request_size == 0 {
            return Err(GatewayError::Config(
                "max_request_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

/// Add-keyword token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Salt mixed into the token digest. Existing clients expect "tt.bloom".
    pub salt: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            salt: LEGACY_SALT.to_string(),
        }
    }
}

/// Request limits
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Max request body size in bytes (form-encoded POST bodies)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 64 * 1024,
        }
    }
}
