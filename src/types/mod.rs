//! Request and option types shared across the engine.

use serde::{Deserialize, Serialize};

use crate::{Result, UnfurlError};

/// Serialization format for raw oEmbed payload output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawFormat {
    #[default]
    Json,
    Xml,
}

impl std::str::FromStr for RawFormat {
    type Err = UnfurlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(RawFormat::Json),
            "xml" => Ok(RawFormat::Xml),
            other => Err(UnfurlError::Validation(format!(
                "invalid raw format '{other}' (expected 'json' or 'xml')"
            ))),
        }
    }
}

/// Discovery link type accepted when scanning a page for oEmbed endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Json,
    Xml,
}

impl std::str::FromStr for LinkType {
    type Err = UnfurlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(LinkType::Json),
            "xml" => Ok(LinkType::Xml),
            other => Err(UnfurlError::Validation(format!(
                "invalid link type '{other}' (expected 'json' or 'xml')"
            ))),
        }
    }
}

/// A single fetch request through the gateway (provider-agnostic).
///
/// Constructed with chained setters:
///
/// ```rust
/// use unfurl::FetchRequest;
///
/// let request = FetchRequest::new("https://youtu.be/dQw4w9WgXcQ")
///     .width(500)
///     .skip_cache(true);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    /// URL to resolve into embed HTML or raw oEmbed data.
    pub url: String,
    /// Maximum embed width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Maximum embed height in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Whether to fall back to link discovery when no provider matches.
    pub discover: bool,
    /// Whether `discover` was set explicitly by the caller. Explicitly-set
    /// values participate in the cache signature; the default does not.
    #[serde(skip)]
    pub discover_explicit: bool,
    /// Bound on discovery page reads, in bytes. Requires `discover`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_size_limit: Option<usize>,
    /// Cache scope. `None` caches under the global scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<u64>,
    /// Ignore cached responses; stores the fresh response with zero TTL.
    pub skip_cache: bool,
    /// Bypass the built-in HTML scrubber on provider output.
    pub skip_sanitization: bool,
    /// Expand placeholder output returned by an embed handler.
    pub expand_placeholders: bool,
    /// Return the raw oEmbed payload instead of rendered HTML.
    pub raw: bool,
    /// Serialization for raw output. Only valid together with `raw`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_format: Option<RawFormat>,
}

impl FetchRequest {
    /// Create a request for a URL with default options (discovery on,
    /// cache on, sanitization on).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
            discover: true,
            discover_explicit: false,
            response_size_limit: None,
            post_id: None,
            skip_cache: false,
            skip_sanitization: false,
            expand_placeholders: false,
            raw: false,
            raw_format: None,
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Enable or disable discovery fallback. Marks the flag as explicit so
    /// it becomes part of the cache signature.
    pub fn discover(mut self, discover: bool) -> Self {
        self.discover = discover;
        self.discover_explicit = true;
        self
    }

    pub fn response_size_limit(mut self, limit: usize) -> Self {
        self.response_size_limit = Some(limit);
        self
    }

    pub fn post_id(mut self, post_id: u64) -> Self {
        self.post_id = Some(post_id);
        self
    }

    pub fn skip_cache(mut self, skip: bool) -> Self {
        self.skip_cache = skip;
        self
    }

    pub fn skip_sanitization(mut self, skip: bool) -> Self {
        self.skip_sanitization = skip;
        self
    }

    pub fn expand_placeholders(mut self, expand: bool) -> Self {
        self.expand_placeholders = expand;
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn raw_format(mut self, format: RawFormat) -> Self {
        self.raw_format = Some(format);
        self
    }

    /// Check option compatibility. Runs before any network or cache access.
    pub fn validate(&self) -> Result<()> {
        if !self.discover && self.response_size_limit.is_some() {
            return Err(UnfurlError::Validation(
                "the 'limit-response-size' option can only be used with discovery".into(),
            ));
        }
        if !self.raw && self.raw_format.is_some() {
            return Err(UnfurlError::Validation(
                "the 'raw-format' option can only be used with the 'raw' option".into(),
            ));
        }
        Ok(())
    }
}

/// Options for matching a URL to a provider endpoint without fetching it.
#[derive(Debug, Clone)]
pub struct ProviderMatchOptions {
    /// Whether to fall back to link discovery when no provider matches.
    pub discover: bool,
    /// Bound on discovery page reads, in bytes. Requires `discover`.
    pub response_size_limit: Option<usize>,
    /// Restrict discovery to a single link type. Requires `discover`.
    pub link_type: Option<LinkType>,
}

impl Default for ProviderMatchOptions {
    fn default() -> Self {
        Self {
            discover: true,
            response_size_limit: None,
            link_type: None,
        }
    }
}

impl ProviderMatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discover(mut self, discover: bool) -> Self {
        self.discover = discover;
        self
    }

    pub fn response_size_limit(mut self, limit: usize) -> Self {
        self.response_size_limit = Some(limit);
        self
    }

    pub fn link_type(mut self, link_type: LinkType) -> Self {
        self.link_type = Some(link_type);
        self
    }

    /// Check option compatibility. The combined message mirrors the case
    /// where both discovery-only options were supplied.
    pub fn validate(&self) -> Result<()> {
        if self.discover {
            return Ok(());
        }
        match (self.response_size_limit.is_some(), self.link_type.is_some()) {
            (true, true) => Err(UnfurlError::Validation(
                "the 'limit-response-size' and 'link-type' options can only be used with discovery"
                    .into(),
            )),
            (true, false) => Err(UnfurlError::Validation(
                "the 'limit-response-size' option can only be used with discovery".into(),
            )),
            (false, true) => Err(UnfurlError::Validation(
                "the 'link-type' option can only be used with discovery".into(),
            )),
            (false, false) => Ok(()),
        }
    }
}
