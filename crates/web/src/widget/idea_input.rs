//! Idea input widget.
//!
//! A headless controller for the "new idea" form. It owns three pieces of
//! state (title, description, the last failure) and talks to the outside
//! world only through the collaborators handed to [`IdeaInput::new`]:
//!
//! - a [`DraftCache`] that keeps unsaved text across reloads,
//! - an [`IdeaService`] that creates the idea,
//! - a [`Page`] that owns focus, the sign-in prompt, and navigation.
//!
//! The host calls [`IdeaInput::mount`] once the input exists, forwards focus
//! and change events, and calls [`IdeaInput::submit`] on click. Submission
//! takes `&mut self`, so a second submit cannot start while one is pending.

use ideabox_core::{
    CACHE_DESCRIPTION_KEY, CACHE_TITLE_KEY, Draft, Failure, IdeaCreated, MAX_TITLE_LENGTH,
};

use super::{DraftCache, Page};
use crate::models::CurrentUser;
use crate::services::IdeaService;

/// What happened on a call to [`IdeaInput::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Title was empty; nothing was sent.
    Skipped,
    /// The idea was created and the page was sent to its URL.
    Created(IdeaCreated),
    /// The service rejected the idea; the failure is shown inline.
    Failed(Failure),
}

/// Render model for the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaInputView {
    pub placeholder: String,
    pub title: String,
    pub description: String,
    /// Description field and submit button appear once there is a title.
    pub show_details: bool,
    pub submit_disabled: bool,
    pub failure: Option<Failure>,
}

/// Controller for the "new idea" input.
pub struct IdeaInput<C, S, P> {
    placeholder: String,
    user: Option<CurrentUser>,
    draft: Draft,
    failure: Option<Failure>,
    cache: C,
    service: S,
    page: P,
}

impl<C: DraftCache, S, P> IdeaInput<C, S, P> {
    /// Build the widget, restoring any cached draft.
    pub fn new(
        placeholder: impl Into<String>,
        user: Option<CurrentUser>,
        cache: C,
        service: S,
        page: P,
    ) -> Self {
        let draft = Draft::from_cached(
            cache.get_cache(CACHE_TITLE_KEY),
            cache.get_cache(CACHE_DESCRIPTION_KEY),
        );

        Self {
            placeholder: placeholder.into(),
            user,
            draft,
            failure: None,
            cache,
            service,
            page,
        }
    }

    pub fn on_title_changed(&mut self, title: impl Into<String>) {
        let mut title = title.into();
        if let Some((cut, _)) = title.char_indices().nth(MAX_TITLE_LENGTH) {
            title.truncate(cut);
        }
        self.cache.set_cache(CACHE_TITLE_KEY, &title);
        self.draft.title = title;
    }

    pub fn on_description_changed(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.cache.set_cache(CACHE_DESCRIPTION_KEY, &description);
        self.draft.description = description;
    }

    #[must_use]
    pub fn view(&self) -> IdeaInputView {
        let has_title = self.draft.has_title();
        IdeaInputView {
            placeholder: self.placeholder.clone(),
            title: self.draft.title.clone(),
            description: self.draft.description.clone(),
            show_details: has_title,
            submit_disabled: !has_title,
            failure: self.failure.clone(),
        }
    }

    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    #[must_use]
    pub const fn page(&self) -> &P {
        &self.page
    }

    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }
}

impl<C, S, P> IdeaInput<C, S, P>
where
    C: DraftCache,
    S: IdeaService,
    P: Page,
{
    /// Signed-in users get the cursor straight away.
    pub fn mount(&mut self) {
        if self.user.is_some() {
            self.page.focus_title();
        }
    }

    /// Anonymous users cannot type; bounce focus and ask them to sign in.
    pub fn on_title_focused(&mut self) {
        if self.user.is_none() {
            self.page.blur_title();
            self.page.show_sign_in();
        }
    }

    /// Submit the current draft.
    ///
    /// With an empty title this is a no-op. On success the cached draft and
    /// any displayed failure are cleared and the page navigates to the new
    /// idea; on failure the returned [`Failure`] is kept for display and
    /// nothing else changes.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.draft.has_title() {
            return SubmitOutcome::Skipped;
        }

        match self
            .service
            .add_idea(&self.draft.title, &self.draft.description)
            .await
        {
            Ok(created) => {
                self.cache
                    .remove_cache(&[CACHE_TITLE_KEY, CACHE_DESCRIPTION_KEY]);
                self.failure = None;
                self.page.navigate(&created.redirect_path());
                SubmitOutcome::Created(created)
            }
            Err(failure) => {
                tracing::debug!(failure = %failure, "Idea rejected");
                self.failure = Some(failure.clone());
                SubmitOutcome::Failed(failure)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ideabox_core::{Email, IdeaNumber, Slug, UserId};

    use super::*;
    use crate::widget::MemoryDraftCache;

    #[derive(Debug, Default, PartialEq, Eq)]
    struct RecordingPage {
        events: Vec<String>,
    }

    impl Page for RecordingPage {
        fn focus_title(&mut self) {
            self.events.push("focus".to_owned());
        }

        fn blur_title(&mut self) {
            self.events.push("blur".to_owned());
        }

        fn show_sign_in(&mut self) {
            self.events.push("sign-in".to_owned());
        }

        fn navigate(&mut self, url: &str) {
            self.events.push(format!("navigate {url}"));
        }
    }

    struct FakeService {
        result: Result<IdeaCreated, Failure>,
        calls: AtomicUsize,
    }

    impl FakeService {
        fn ok(number: i32, slug: &str) -> Self {
            Self {
                result: Ok(IdeaCreated {
                    number: IdeaNumber::new(number),
                    slug: Slug::from_title(slug),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(failure: Failure) -> Self {
            Self {
                result: Err(failure),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdeaService for FakeService {
        async fn add_idea(&self, _title: &str, _description: &str) -> Result<IdeaCreated, Failure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            name: "ana".to_owned(),
            email: Email::parse("ana@example.com").unwrap(),
        }
    }

    fn widget(
        user: Option<CurrentUser>,
        cache: MemoryDraftCache,
        service: FakeService,
    ) -> IdeaInput<MemoryDraftCache, FakeService, RecordingPage> {
        IdeaInput::new(
            "Enter your idea",
            user,
            cache,
            service,
            RecordingPage::default(),
        )
    }

    #[test]
    fn test_restores_cached_draft() {
        let cache = MemoryDraftCache::new();
        cache.set_cache(CACHE_TITLE_KEY, "Add a dark mode");
        cache.set_cache(CACHE_DESCRIPTION_KEY, "At night");

        let input = widget(Some(user()), cache, FakeService::ok(1, "x"));
        assert_eq!(input.draft().title, "Add a dark mode");
        assert_eq!(input.draft().description, "At night");
        assert!(input.view().show_details);
    }

    #[test]
    fn test_mount_focuses_only_for_signed_in_users() {
        let mut signed_in = widget(Some(user()), MemoryDraftCache::new(), FakeService::ok(1, "x"));
        signed_in.mount();
        assert_eq!(signed_in.page().events, ["focus"]);

        let mut anonymous = widget(None, MemoryDraftCache::new(), FakeService::ok(1, "x"));
        anonymous.mount();
        assert!(anonymous.page().events.is_empty());
    }

    #[test]
    fn test_focus_guard_prompts_sign_in() {
        let mut anonymous = widget(None, MemoryDraftCache::new(), FakeService::ok(1, "x"));
        anonymous.on_title_focused();
        assert_eq!(anonymous.page().events, ["blur", "sign-in"]);

        let mut signed_in = widget(Some(user()), MemoryDraftCache::new(), FakeService::ok(1, "x"));
        signed_in.on_title_focused();
        assert!(signed_in.page().events.is_empty());
    }

    #[test]
    fn test_changes_are_cached() {
        let mut input = widget(Some(user()), MemoryDraftCache::new(), FakeService::ok(1, "x"));
        input.on_title_changed("Add a dark mode");
        input.on_description_changed("Please");

        assert_eq!(
            input.cache().get_cache(CACHE_TITLE_KEY).as_deref(),
            Some("Add a dark mode")
        );
        assert_eq!(
            input.cache().get_cache(CACHE_DESCRIPTION_KEY).as_deref(),
            Some("Please")
        );
    }

    #[test]
    fn test_title_is_clamped() {
        let mut input = widget(Some(user()), MemoryDraftCache::new(), FakeService::ok(1, "x"));
        input.on_title_changed("é".repeat(MAX_TITLE_LENGTH + 5));
        assert_eq!(input.draft().title.chars().count(), MAX_TITLE_LENGTH);
    }

    #[test]
    fn test_details_hidden_without_title() {
        let input = widget(Some(user()), MemoryDraftCache::new(), FakeService::ok(1, "x"));
        let view = input.view();
        assert!(!view.show_details);
        assert!(view.submit_disabled);
        assert_eq!(view.placeholder, "Enter your idea");
    }

    #[tokio::test]
    async fn test_empty_title_never_calls_service() {
        let mut input = widget(Some(user()), MemoryDraftCache::new(), FakeService::ok(1, "x"));
        input.on_description_changed("only a description");

        assert_eq!(input.submit().await, SubmitOutcome::Skipped);
        assert_eq!(input.service.calls.load(Ordering::SeqCst), 0);
        assert!(input.page().events.is_empty());
    }

    #[tokio::test]
    async fn test_success_clears_cache_and_navigates_once() {
        let mut input = widget(
            Some(user()),
            MemoryDraftCache::new(),
            FakeService::ok(7, "Add a dark mode"),
        );
        input.on_title_changed("Add a dark mode");
        input.on_description_changed("Please");

        let outcome = input.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert_eq!(input.service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(input.cache().get_cache(CACHE_TITLE_KEY), None);
        assert_eq!(input.cache().get_cache(CACHE_DESCRIPTION_KEY), None);
        assert_eq!(input.page().events, ["navigate /ideas/7/add-a-dark-mode"]);
        assert_eq!(input.view().failure, None);
    }

    #[tokio::test]
    async fn test_failure_keeps_cache_and_shows_error() {
        let failure = Failure::field("title", "Title needs to be more descriptive.");
        let mut input = widget(
            Some(user()),
            MemoryDraftCache::new(),
            FakeService::failing(failure.clone()),
        );
        input.on_title_changed("Dark");

        assert_eq!(input.submit().await, SubmitOutcome::Failed(failure.clone()));
        assert_eq!(
            input.cache().get_cache(CACHE_TITLE_KEY).as_deref(),
            Some("Dark")
        );
        assert!(input.page().events.is_empty());
        assert_eq!(input.view().failure, Some(failure));
    }

    #[tokio::test]
    async fn test_success_after_failure_clears_error() {
        let mut input = widget(Some(user()), MemoryDraftCache::new(), FakeService::ok(2, "x"));
        input.failure = Some(Failure::message("earlier"));
        input.on_title_changed("Add a dark mode");

        input.submit().await;
        assert_eq!(input.view().failure, None);
    }
}
