//! TOML provider file loading.
//!
//! Extends a [`ProviderRegistry`] with entries from a TOML document:
//!
//! ```toml
//! [[provider]]
//! pattern = "https://gallery.example.com/*"
//! endpoint = "https://gallery.example.com/oembed"
//!
//! [[provider]]
//! pattern = 'https?://media\.example\.org/.+'
//! endpoint = "https://media.example.org/oembed.{format}"
//! regex = true
//! ```

use serde::Deserialize;

use super::{ProviderPattern, ProviderRegistry};
use crate::{Result, UnfurlError};

/// Parsed providers file.
#[derive(Debug, Deserialize)]
pub struct ProvidersFile {
    #[serde(default)]
    provider: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    pattern: String,
    endpoint: String,
    /// When true, `pattern` is a regex; otherwise a wildcard mask.
    #[serde(default)]
    regex: bool,
}

impl ProvidersFile {
    /// Parse a TOML document.
    pub fn parse(document: &str) -> Result<Self> {
        toml::from_str(document)
            .map_err(|e| UnfurlError::Configuration(format!("invalid providers file: {e}")))
    }

    /// Number of provider entries in the file.
    pub fn len(&self) -> usize {
        self.provider.len()
    }

    /// Whether the file declares no providers.
    pub fn is_empty(&self) -> bool {
        self.provider.is_empty()
    }
}

impl ProviderRegistry {
    /// Append all entries from a TOML providers document, in file order,
    /// after any already-registered providers. Returns the number added.
    pub fn extend_from_toml_str(&mut self, document: &str) -> Result<usize> {
        let file = ProvidersFile::parse(document)?;
        let count = file.provider.len();
        for entry in file.provider {
            let pattern = if entry.regex {
                ProviderPattern::Regex(entry.pattern)
            } else {
                ProviderPattern::Wildcard(entry.pattern)
            };
            self.register(pattern, entry.endpoint)?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[provider]]
pattern = "https://gallery.example.com/*"
endpoint = "https://gallery.example.com/oembed"

[[provider]]
pattern = 'https?://media\.example\.org/.+'
endpoint = "https://media.example.org/oembed.{format}"
regex = true
"#;

    #[test]
    fn parse_counts_entries() {
        let file = ProvidersFile::parse(SAMPLE).unwrap();
        assert_eq!(file.len(), 2);
    }

    #[test]
    fn extend_appends_after_existing_entries() {
        let mut registry = ProviderRegistry::new();
        registry
            .register(
                ProviderPattern::Regex(r"https?://gallery\.example\.com/.*".into()),
                "https://earlier.example/oembed",
            )
            .unwrap();
        let added = registry.extend_from_toml_str(SAMPLE).unwrap();
        assert_eq!(added, 2);

        // Earlier registration still wins for overlapping URLs.
        assert_eq!(
            registry.match_url("https://gallery.example.com/item/9"),
            Some("https://earlier.example/oembed")
        );
        assert_eq!(
            registry.match_url("https://media.example.org/clip"),
            Some("https://media.example.org/oembed.{format}")
        );
    }

    #[test]
    fn malformed_document_is_a_configuration_error() {
        let mut registry = ProviderRegistry::new();
        let result = registry.extend_from_toml_str("[[provider]]\npattern = 3\n");
        assert!(matches!(result, Err(UnfurlError::Configuration(_))));
    }

    #[test]
    fn empty_document_adds_nothing() {
        let mut registry = ProviderRegistry::new();
        assert_eq!(registry.extend_from_toml_str("").unwrap(), 0);
        assert!(registry.is_empty());
    }
}
