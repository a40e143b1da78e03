//! Headless UI controllers and the collaborators they drive.

pub mod idea_input;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub use idea_input::{IdeaInput, IdeaInputView, SubmitOutcome};

/// Key/value storage for unsaved form text.
pub trait DraftCache: Send + Sync {
    fn get_cache(&self, key: &str) -> Option<String>;
    fn set_cache(&self, key: &str, value: &str);
    fn remove_cache(&self, keys: &[&str]);
}

/// The page hosting a widget.
pub trait Page: Send {
    fn focus_title(&mut self);
    fn blur_title(&mut self);
    /// Open the sign-in prompt.
    fn show_sign_in(&mut self);
    fn navigate(&mut self, url: &str);
}

/// Process-local [`DraftCache`].
#[derive(Debug, Default)]
pub struct MemoryDraftCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryDraftCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DraftCache for MemoryDraftCache {
    fn get_cache(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set_cache(&self, key: &str, value: &str) {
        self.entries().insert(key.to_owned(), value.to_owned());
    }

    fn remove_cache(&self, keys: &[&str]) {
        let mut entries = self.entries();
        for key in keys {
            entries.remove(*key);
        }
    }
}

impl<T: DraftCache + ?Sized> DraftCache for std::sync::Arc<T> {
    fn get_cache(&self, key: &str) -> Option<String> {
        (**self).get_cache(key)
    }

    fn set_cache(&self, key: &str, value: &str) {
        (**self).set_cache(key, value);
    }

    fn remove_cache(&self, keys: &[&str]) {
        (**self).remove_cache(keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_only_named_keys() {
        let cache = MemoryDraftCache::new();
        cache.set_cache("a", "1");
        cache.set_cache("b", "2");
        cache.set_cache("c", "3");

        cache.remove_cache(&["a", "b"]);

        assert_eq!(cache.get_cache("a"), None);
        assert_eq!(cache.get_cache("b"), None);
        assert_eq!(cache.get_cache("c").as_deref(), Some("3"));
    }
}
