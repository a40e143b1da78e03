//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::Store;
use crate::services::{LocalIdeaService, Mailer, SignInService, TagService};
use ideabox_core::UserId;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    sign_in: SignInService,
    tags: TagService,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `pool` is only used by the readiness check; pass `None` when running
    /// on an in-memory store.
    #[must_use]
    pub fn new(
        base_url: &str,
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        pool: Option<PgPool>,
    ) -> Self {
        let sign_in = SignInService::new(store.clone(), mailer, base_url);
        let tags = TagService::new(store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                store,
                sign_in,
                tags,
                pool,
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    #[must_use]
    pub fn sign_in(&self) -> &SignInService {
        &self.inner.sign_in
    }

    #[must_use]
    pub fn tags(&self) -> &TagService {
        &self.inner.tags
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Idea service acting for `user_id`.
    #[must_use]
    pub fn ideas_for(&self, user_id: UserId) -> LocalIdeaService {
        LocalIdeaService::new(self.inner.store.clone(), user_id)
    }
}
