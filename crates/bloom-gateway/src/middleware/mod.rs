//! Middleware stack for the gateway.
//!
//! Layer order: Request → Tracing → PanicGuard → BodyLimit → Handler

pub mod panic_guard;
pub mod trace;

pub use panic_guard::{install_panic_hook, panic_message, PanicGuardLayer};
pub use trace::TracingLayer;
