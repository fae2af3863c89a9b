//! Ordered provider registry with first-match-wins lookup.

use regex::{Regex, RegexBuilder};

use crate::{Result, UnfurlError};

/// How a provider's URL pattern is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPattern {
    /// Asterisk-wildcard mask, e.g. `https://soundcloud.com/*`. Each `*`
    /// matches one or more characters.
    Wildcard(String),
    /// A regex matched verbatim (case-insensitively), e.g.
    /// `https?://youtu\.be/.*`.
    Regex(String),
}

impl ProviderPattern {
    /// The pattern source string as registered.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard(s) | Self::Regex(s) => s,
        }
    }

    /// The regex source this pattern matches with. Wildcard masks are
    /// converted; regex patterns pass through.
    pub fn regex_source(&self) -> String {
        match self {
            Self::Wildcard(mask) => wildcard_to_regex(mask),
            Self::Regex(pattern) => pattern.clone(),
        }
    }
}

/// A single provider: pattern plus the oEmbed endpoint it resolves to.
///
/// The endpoint may contain a literal `{format}` placeholder substituted
/// with the requested response format at fetch time.
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub pattern: ProviderPattern,
    pub endpoint: String,
    compiled: Regex,
}

impl ProviderEntry {
    /// Compile a pattern into a ready-to-match entry.
    pub fn new(pattern: ProviderPattern, endpoint: impl Into<String>) -> Result<Self> {
        let source = pattern.regex_source();
        let compiled = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                UnfurlError::Configuration(format!(
                    "invalid provider pattern '{}': {e}",
                    pattern.as_str()
                ))
            })?;
        Ok(Self {
            pattern,
            endpoint: endpoint.into(),
            compiled,
        })
    }

    /// Whether this entry's pattern matches the URL.
    pub fn matches(&self, url: &str) -> bool {
        self.compiled.is_match(url)
    }
}

/// One row of `list()` output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderListing {
    /// The pattern as registered, or its regex rendering under force-regex.
    pub format: String,
    pub endpoint: String,
    /// Whether the registered pattern was already a regex.
    pub regex: bool,
}

/// Ordered table of providers. First match wins; lookups never mutate.
pub struct ProviderRegistry {
    entries: Vec<ProviderEntry>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a registry pre-populated with the built-in provider table.
    pub fn with_builtin_providers() -> Self {
        let mut registry = Self::new();
        for (pattern, endpoint, is_regex) in super::seed::BUILTIN_PROVIDERS {
            let pattern = if *is_regex {
                ProviderPattern::Regex((*pattern).to_string())
            } else {
                ProviderPattern::Wildcard((*pattern).to_string())
            };
            // Seed patterns are compile-checked by tests.
            if let Ok(entry) = ProviderEntry::new(pattern, *endpoint) {
                registry.entries.push(entry);
            }
        }
        registry
    }

    /// Append a provider to the end of the table.
    pub fn register(
        &mut self,
        pattern: ProviderPattern,
        endpoint: impl Into<String>,
    ) -> Result<()> {
        self.entries.push(ProviderEntry::new(pattern, endpoint)?);
        Ok(())
    }

    /// Match a URL against the table, returning the first matching
    /// endpoint in registration order.
    pub fn match_url(&self, url: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.matches(url))
            .map(|entry| entry.endpoint.as_str())
    }

    /// List all entries. With `force_regex`, wildcard patterns render as
    /// their compiled-equivalent regex literal.
    pub fn list(&self, force_regex: bool) -> Vec<ProviderListing> {
        self.entries
            .iter()
            .map(|entry| {
                let is_regex = matches!(entry.pattern, ProviderPattern::Regex(_));
                let format = if force_regex && !is_regex {
                    format!("(?i){}", entry.pattern.regex_source())
                } else {
                    entry.pattern.as_str().to_string()
                };
                ProviderListing {
                    format,
                    endpoint: entry.endpoint.clone(),
                    regex: is_regex,
                }
            })
            .collect()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an asterisk-wildcard mask into regex source.
///
/// Regex metacharacters in the mask are quoted, each `*` becomes a greedy
/// `(.+)` capture, and a literal `http://` head widens to `https?://` so
/// masks registered before TLS rollouts keep matching.
pub(crate) fn wildcard_to_regex(mask: &str) -> String {
    const MARKER: &str = "___wildcard___";
    let masked = mask.replace('*', MARKER);
    let converted = regex::escape(&masked).replace(MARKER, "(.+)");
    match converted.strip_prefix("http://") {
        Some(rest) => format!("https?://{rest}"),
        None => converted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(entries: &[(ProviderPattern, &str)]) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        for (pattern, endpoint) in entries {
            registry.register(pattern.clone(), *endpoint).unwrap();
        }
        registry
    }

    #[test]
    fn wildcard_conversion_quotes_metacharacters() {
        let source = wildcard_to_regex("https://soundcloud.com/*");
        assert_eq!(source, "https://soundcloud\\.com/(.+)");
    }

    #[test]
    fn wildcard_conversion_widens_http_head() {
        let source = wildcard_to_regex("http://*.example.com/*");
        assert!(source.starts_with("https?://"));
    }

    #[test]
    fn wildcard_match_agrees_with_converted_regex() {
        // Round-trip property: the wildcard entry accepts exactly what its
        // converted regex accepts.
        let mask = "https://soundcloud.com/*";
        let entry = ProviderEntry::new(
            ProviderPattern::Wildcard(mask.into()),
            "https://soundcloud.com/oembed",
        )
        .unwrap();
        let converted = regex::RegexBuilder::new(&wildcard_to_regex(mask))
            .case_insensitive(true)
            .build()
            .unwrap();

        for url in [
            "https://soundcloud.com/artist/track",
            "HTTPS://SOUNDCLOUD.COM/ARTIST",
            "https://soundcloud.com/",
            "https://example.com/other",
        ] {
            assert_eq!(entry.matches(url), converted.is_match(url), "url: {url}");
        }
    }

    #[test]
    fn first_match_wins_in_registration_order() {
        let registry = registry_with(&[
            (
                ProviderPattern::Regex(r"https?://example\.com/.*".into()),
                "https://first.example/oembed",
            ),
            (
                ProviderPattern::Regex(r"https?://example\.com/video/.*".into()),
                "https://second.example/oembed",
            ),
        ]);
        assert_eq!(
            registry.match_url("https://example.com/video/1"),
            Some("https://first.example/oembed")
        );
    }

    #[test]
    fn no_match_returns_none() {
        let registry = ProviderRegistry::with_builtin_providers();
        assert!(registry.match_url("https://nothing.invalid/x").is_none());
    }

    #[test]
    fn youtube_short_url_matches_seed_table() {
        let registry = ProviderRegistry::with_builtin_providers();
        assert_eq!(
            registry.match_url("https://youtu.be/dQw4w9WgXcQ"),
            Some("https://www.youtube.com/oembed")
        );
    }

    #[test]
    fn builtin_table_compiles_completely() {
        let registry = ProviderRegistry::with_builtin_providers();
        assert_eq!(registry.len(), super::super::seed::BUILTIN_PROVIDERS.len());
    }

    #[test]
    fn list_preserves_original_patterns() {
        let registry = registry_with(&[(
            ProviderPattern::Wildcard("https://soundcloud.com/*".into()),
            "https://soundcloud.com/oembed",
        )]);
        let listings = registry.list(false);
        assert_eq!(listings[0].format, "https://soundcloud.com/*");
        assert!(!listings[0].regex);
    }

    #[test]
    fn list_force_regex_rewrites_wildcards_only() {
        let registry = registry_with(&[
            (
                ProviderPattern::Wildcard("http://soundcloud.com/*".into()),
                "https://soundcloud.com/oembed",
            ),
            (
                ProviderPattern::Regex(r"https?://youtu\.be/.*".into()),
                "https://www.youtube.com/oembed",
            ),
        ]);
        let listings = registry.list(true);
        assert_eq!(listings[0].format, "(?i)https?://soundcloud\\.com/(.+)");
        assert_eq!(listings[1].format, r"https?://youtu\.be/.*");
    }

    #[test]
    fn invalid_regex_pattern_is_a_configuration_error() {
        let mut registry = ProviderRegistry::new();
        let result = registry.register(
            ProviderPattern::Regex("https?://(unclosed".into()),
            "https://example.com/oembed",
        );
        assert!(matches!(result, Err(crate::UnfurlError::Configuration(_))));
    }
}
