//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page with the idea input
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (database)
//!
//! # Ideas
//! POST /ideas                   - Submit the idea form (redirects to the idea)
//! POST /ideas/draft             - Save the draft in the session
//! GET  /ideas/{number}/{slug}   - Idea detail with tags and comments
//! POST /api/ideas               - Create an idea (JSON, requires sign-in)
//! PUT  /api/ideas/{number}      - Edit an idea (collaborator)
//! POST /api/ideas/{number}/comments - Comment (signed in)
//! PUT  /api/ideas/{number}/status   - Set status and response (collaborator)
//!
//! # Tags
//! GET    /api/tags                            - Tags visible to the viewer
//! POST   /api/ideas/{number}/tags/{slug}      - Assign (collaborator)
//! DELETE /api/ideas/{number}/tags/{slug}      - Unassign (collaborator)
//! POST   /api/admin/tags                      - Create (administrator)
//! PUT    /api/admin/tags/{slug}               - Edit (administrator)
//! DELETE /api/admin/tags/{slug}               - Remove (administrator)
//!
//! # Members
//! PUT  /api/admin/members/{id}/role - Change a member's role (administrator)
//!
//! # Sign-in
//! POST /signin                  - Request a sign-in link (form)
//! POST /api/signin              - Request a sign-in link (JSON)
//! GET  /signin/verify?k=        - Complete sign-in
//! ```

pub mod health;
pub mod home;
pub mod ideas;
pub mod members;
pub mod signin;
pub mod tags;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the idea routes router.
pub fn idea_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(ideas::submit))
        .route("/draft", post(ideas::save_draft))
        .route("/{number}/{slug}", get(ideas::show))
}

/// Create the administrator API router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", post(tags::create))
        .route("/tags/{slug}", put(tags::update).delete(tags::remove))
        .route("/members/{id}/role", put(members::set_role))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ideas", post(ideas::create))
        .route("/ideas/{number}", put(ideas::update))
        .route("/ideas/{number}/comments", post(ideas::comment))
        .route("/ideas/{number}/status", put(ideas::respond))
        .route(
            "/ideas/{number}/tags/{slug}",
            post(tags::assign).delete(tags::unassign),
        )
        .route("/tags", get(tags::list))
        .route("/signin", post(signin::request))
        .nest("/admin", admin_routes())
}

/// Create all routes for the board.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/ideas", idea_routes())
        .route("/signin", post(signin::request_form))
        .route("/signin/verify", get(signin::verify))
        .nest("/api", api_routes())
}
