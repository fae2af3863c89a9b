//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheConfig, ResponseCache};
use crate::discovery::{DiscoveryResolver, DEFAULT_TIMEOUT};
use crate::handlers::HandlerRegistry;
use crate::oembed::EndpointClient;
use crate::providers::ProviderRegistry;
use crate::{Result, UnfurlError};

use super::EmbedGateway;

/// Expansion function applied to handler placeholder output when a
/// request asks for expansion.
pub type PlaceholderExpander = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Main entry point for creating gateway instances.
pub struct Unfurl;

impl Unfurl {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> UnfurlBuilder {
        UnfurlBuilder::new()
    }
}

/// Builder for configuring gateway instances.
///
/// Defaults: the built-in provider table, the built-in audio/video
/// handlers, a 10,000-entry cache with a one-day default TTL, a 30 s
/// request timeout, and no placeholder expander.
pub struct UnfurlBuilder {
    providers: Option<ProviderRegistry>,
    handlers: Option<HandlerRegistry>,
    cache_config: CacheConfig,
    timeout: Duration,
    expander: Option<PlaceholderExpander>,
}

impl UnfurlBuilder {
    pub fn new() -> Self {
        Self {
            providers: None,
            handlers: None,
            cache_config: CacheConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            expander: None,
        }
    }

    /// Replace the provider table (default: built-in providers).
    pub fn providers(mut self, registry: ProviderRegistry) -> Self {
        self.providers = Some(registry);
        self
    }

    /// Replace the handler table (default: built-in audio/video handlers).
    pub fn handlers(mut self, registry: HandlerRegistry) -> Self {
        self.handlers = Some(registry);
        self
    }

    /// Configure the response cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Set the timeout for discovery and endpoint fetches (seconds).
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Install the expansion function applied to handler placeholder
    /// output when a request sets `expand_placeholders`.
    pub fn expander(mut self, expander: PlaceholderExpander) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<EmbedGateway> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| UnfurlError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let providers = self
            .providers
            .unwrap_or_else(ProviderRegistry::with_builtin_providers);
        let handlers = self
            .handlers
            .unwrap_or_else(HandlerRegistry::with_builtin_handlers);
        let cache = ResponseCache::new(&self.cache_config);
        let discovery = DiscoveryResolver::new(http.clone());
        let endpoint_client = EndpointClient::new(http);

        Ok(EmbedGateway::new(
            providers,
            handlers,
            cache,
            discovery,
            endpoint_client,
            self.cache_config.default_ttl,
            self.expander,
        ))
    }
}

impl Default for UnfurlBuilder {
    fn default() -> Self {
        Self::new()
    }
}
