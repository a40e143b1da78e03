//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. Request ID
//! 3. `TraceLayer` (request tracing)
//! 4. Session layer (tower-sessions, signed cookie)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, require_role, set_current_user};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
