//! Per-request crash isolation.
//!
//! A panic raised while handling one request is caught here and turned into a
//! `500` for that request only. The listener and other in-flight requests are
//! unaffected. The backtrace is logged by the process panic hook
//! (`install_panic_hook`), which runs at the panic site before unwinding.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tower::{Layer, Service};
use tracing::error;

/// Crash-isolation layer
#[derive(Clone, Default)]
pub struct PanicGuardLayer;

impl PanicGuardLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for PanicGuardLayer {
    type Service = PanicGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PanicGuardService { inner }
    }
}

/// Crash-isolation service
#[derive(Clone)]
pub struct PanicGuardService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for PanicGuardService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        Box::pin(async move {
            // Panics can surface both while building the future and while polling it
            let future = match panic::catch_unwind(AssertUnwindSafe(|| inner.call(req))) {
                Ok(future) => future,
                Err(payload) => return Ok(panic_response(&method, &path, payload)),
            };

            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Ok(panic_response(&method, &path, payload)),
            }
        })
    }
}

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Log a caught panic and build the 500 response
fn panic_response(method: &Method, path: &str, payload: Box<dyn Any + Send>) -> Response {
    let message = panic_message(payload.as_ref());
    error!(
        http.method = %method,
        http.target = path,
        panic = %message,
        "Panic while handling request"
    );

    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}

/// Install a process-wide panic hook that logs the panic with a backtrace
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        error!(panic = %info, "Panic captured\n{backtrace}");
    }));
}
