//! Locally registered embed handlers.
//!
//! Handlers bypass providers and discovery entirely: each one pairs a URL
//! regex with a rendering callback, and the registry picks the first match
//! in ascending priority order (registration order breaks ties). A handler
//! may return final HTML or a placeholder that needs a second expansion
//! pass — see [`HandlerOutput`].

mod builtin;

pub use builtin::{expand_media_placeholder, AudioFileHandler, VideoFileHandler};

use std::sync::Arc;

use regex::Regex;

use crate::{Result, UnfurlError};

/// Result of invoking a handler callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutput {
    /// Final embed HTML, ready to return.
    Rendered(String),
    /// Placeholder text requiring expansion by an injected expander
    /// before it becomes HTML.
    NeedsExpansion(String),
}

/// A handler's rendering callback.
pub trait EmbedHandler: Send + Sync {
    /// Callback name, shown in handler listings.
    fn name(&self) -> &str;

    /// Render the matched URL. `captures` are the groups of the handler's
    /// own regex applied to `url`.
    fn render(&self, url: &str, captures: &regex::Captures<'_>) -> HandlerOutput;
}

/// A registered handler: id, match regex, priority, callback.
#[derive(Clone)]
pub struct HandlerEntry {
    pub id: String,
    pub regex: Regex,
    /// Lower runs first.
    pub priority: u32,
    pub callback: Arc<dyn EmbedHandler>,
}

/// One row of `list()` output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HandlerListing {
    pub id: String,
    pub regex: String,
    pub priority: u32,
    pub callback: String,
}

/// Priority-ordered handler table. Read-only after gateway construction.
pub struct HandlerRegistry {
    entries: Vec<HandlerEntry>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a registry with the built-in audio/video file handlers at
    /// priority 9999.
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new();
        registry
            .register("audio", builtin::AUDIO_URL_REGEX, 9999, Arc::new(AudioFileHandler))
            .expect("builtin audio regex compiles");
        registry
            .register("video", builtin::VIDEO_URL_REGEX, 9999, Arc::new(VideoFileHandler))
            .expect("builtin video regex compiles");
        registry
    }

    /// Register a handler. A duplicate `id` replaces the existing entry,
    /// taking the new priority and a fresh position in registration order.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        regex: &str,
        priority: u32,
        callback: Arc<dyn EmbedHandler>,
    ) -> Result<()> {
        let id = id.into();
        let regex = Regex::new(regex).map_err(|e| {
            UnfurlError::Configuration(format!("invalid handler regex for '{id}': {e}"))
        })?;
        self.entries.retain(|entry| entry.id != id);
        self.entries.push(HandlerEntry {
            id,
            regex,
            priority,
            callback,
        });
        Ok(())
    }

    /// Find the first handler matching a URL, scanning by ascending
    /// priority with registration order breaking ties.
    pub fn find(&self, url: &str) -> Option<&HandlerEntry> {
        self.ordered().into_iter().find(|entry| entry.regex.is_match(url))
    }

    /// Invoke the matching handler's callback, if any.
    pub fn render(&self, url: &str) -> Option<HandlerOutput> {
        let entry = self.find(url)?;
        let captures = entry.regex.captures(url)?;
        Some(entry.callback.render(url, &captures))
    }

    /// List all handlers in lookup order.
    pub fn list(&self) -> Vec<HandlerListing> {
        self.ordered()
            .into_iter()
            .map(|entry| HandlerListing {
                id: entry.id.clone(),
                regex: entry.regex.as_str().to_string(),
                priority: entry.priority,
                callback: entry.callback.name().to_string(),
            })
            .collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by (priority, registration order). Stable sort keeps
    /// registration order within a priority.
    fn ordered(&self) -> Vec<&HandlerEntry> {
        let mut ordered: Vec<&HandlerEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|entry| entry.priority);
        ordered
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticHandler {
        name: &'static str,
        html: &'static str,
    }

    impl EmbedHandler for StaticHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn render(&self, _url: &str, _captures: &regex::Captures<'_>) -> HandlerOutput {
            HandlerOutput::Rendered(self.html.to_string())
        }
    }

    fn static_handler(name: &'static str, html: &'static str) -> Arc<dyn EmbedHandler> {
        Arc::new(StaticHandler { name, html })
    }

    #[test]
    fn lowest_priority_wins_then_registration_order() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("a", "https?://example", 10, static_handler("a_cb", "<a/>"))
            .unwrap();
        registry
            .register("b", "https?://example", 10, static_handler("b_cb", "<b/>"))
            .unwrap();
        registry
            .register("c", "https?://example", 5, static_handler("c_cb", "<c/>"))
            .unwrap();

        // All three match; c has the lowest priority number.
        let found = registry.find("https://example.com/x").unwrap();
        assert_eq!(found.id, "c");

        // Ordering exposes a, then b, after c (registration tiebreak).
        let ids: Vec<_> = registry.list().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn duplicate_id_replaces_entry() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("dup", "https?://one", 10, static_handler("one", "<one/>"))
            .unwrap();
        registry
            .register("dup", "https?://two", 20, static_handler("two", "<two/>"))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.find("https://one.example/").is_none());
        let found = registry.find("https://two.example/").unwrap();
        assert_eq!(found.priority, 20);
    }

    #[test]
    fn no_match_returns_none() {
        let registry = HandlerRegistry::with_builtin_handlers();
        assert!(registry.find("https://example.com/page").is_none());
    }

    #[test]
    fn invalid_regex_is_a_configuration_error() {
        let mut registry = HandlerRegistry::new();
        let result = registry.register("bad", "(unclosed", 10, static_handler("cb", ""));
        assert!(matches!(result, Err(UnfurlError::Configuration(_))));
    }

    #[test]
    fn render_returns_callback_output() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("x", "https?://example", 10, static_handler("x_cb", "<x/>"))
            .unwrap();
        assert_eq!(
            registry.render("https://example.com/"),
            Some(HandlerOutput::Rendered("<x/>".into()))
        );
    }
}
