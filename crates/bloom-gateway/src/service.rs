//! Gateway service: router construction and the HTTP listener.
//!
//! A `FilterGateway` can only be built from a finished registry, so no route
//! exists before every filter has loaded.

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use bloom_filters::{FilterRegistry, TokenValidator};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

use crate::domain::{GatewayConfig, GatewayError, LimitsConfig};
use crate::handlers::{add_keyword, status, test_membership, AppState};
use crate::middleware::{PanicGuardLayer, TracingLayer};

/// Build the gateway router
pub fn build_router(state: AppState, limits: &LimitsConfig) -> Router {
    Router::new()
        .route("/status", get(status).post(status))
        .route("/bloom", get(test_membership).post(test_membership))
        .route("/addbloom", get(add_keyword).post(add_keyword))
        .layer(RequestBodyLimitLayer::new(limits.max_request_size))
        .layer(PanicGuardLayer::new())
        .layer(TracingLayer::new())
        .with_state(state)
}

/// HTTP gateway over a loaded filter registry
pub struct FilterGateway {
    config: GatewayConfig,
    state: AppState,
}

impl FilterGateway {
    /// Create a gateway over a fully loaded registry
    pub fn new(config: GatewayConfig, registry: Arc<FilterRegistry>) -> Result<Self, GatewayError> {
        config.validate()?;

        let tokens = TokenValidator::new(config.token.salt.clone());
        Ok(Self {
            state: AppState::new(registry, tokens),
            config,
        })
    }

    /// Router with all routes and middleware
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config.limits)
    }

    /// Bind the configured listen address
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr).await.map_err(|source| {
            error!(addr = %addr, error = %source, "Bloom listen error");
            GatewayError::Bind { addr, source }
        })
    }

    /// Serve requests on `listener` until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr().map_err(GatewayError::Serve)?;
        info!(
            addr = %addr,
            filters = ?self.state.registry.names(),
            "Bloom gateway listening"
        );

        let router = self.router();
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                error!(error = %e, "Bloom gateway listener failed");
                GatewayError::Serve(e)
            })?;

        info!("Bloom gateway stopped");
        Ok(())
    }
}
