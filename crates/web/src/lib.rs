//! Ideabox feedback board.
//!
//! Signed-in users submit ideas through the idea input widget; the server
//! validates and stores them and hands back the URL of the new idea.
//!
//! The crate is a library so the integration tests can run the full router
//! in-process; `main.rs` only wires configuration, storage, and telemetry.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod widget;

use axum::{Router, extract::Request, middleware::from_fn};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionStore, cookie::Key};

use state::AppState;

/// Build the board's router over a session store.
///
/// `secure` marks the session cookie `Secure`; `key` signs it.
pub fn app<S>(state: AppState, sessions: S, secure: bool, key: Key) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .merge(routes::routes())
        .layer(middleware::create_session_layer(sessions, secure).with_signed(key))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
