//! EmbedGateway - composes registries, discovery, and the response cache.
//!
//! Per-request state machine:
//!
//! 1. Validation — incompatible options abort before any network or
//!    cache access.
//! 2. Raw path (`raw` set) — providers/discovery only; no handlers, no
//!    cache, no sanitization; output serialized as JSON or XML.
//! 3. Handled path — first matching handler renders; placeholder output
//!    is expanded only on request and only when an expander is installed.
//! 4. Cached provider path — cache read-through keyed on
//!    `(scope, signature)`, then provider match / discovery, endpoint
//!    fetch, render, scrub, cache write. Skip-cache requests bypass the
//!    read and write a zero-TTL marker.

use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::cache::{request_signature, ResponseCache, Scope};
use crate::discovery::{DiscoveryResolver, DEFAULT_RESPONSE_SIZE_LIMIT};
use crate::handlers::{HandlerOutput, HandlerRegistry};
use crate::oembed::{sanitize, xml, EndpointClient, OembedResponse};
use crate::providers::ProviderRegistry;
use crate::telemetry;
use crate::types::{FetchRequest, LinkType, ProviderMatchOptions, RawFormat};
use crate::{Result, UnfurlError};

use super::builder::PlaceholderExpander;

/// The fetch orchestrator. Construct with [`Unfurl::builder()`](crate::Unfurl::builder).
///
/// Registries are immutable once built; the gateway is `Send + Sync` and
/// usable behind `Arc` from concurrent tasks.
pub struct EmbedGateway {
    providers: ProviderRegistry,
    handlers: HandlerRegistry,
    cache: ResponseCache,
    discovery: DiscoveryResolver,
    endpoint_client: EndpointClient,
    default_ttl: Duration,
    expander: Option<PlaceholderExpander>,
}

impl EmbedGateway {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        providers: ProviderRegistry,
        handlers: HandlerRegistry,
        cache: ResponseCache,
        discovery: DiscoveryResolver,
        endpoint_client: EndpointClient,
        default_ttl: Duration,
        expander: Option<PlaceholderExpander>,
    ) -> Self {
        Self {
            providers,
            handlers,
            cache,
            discovery,
            endpoint_client,
            default_ttl,
            expander,
        }
    }

    /// The provider table.
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// The handler table.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// The response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Resolve a request to its final output: embed HTML, or the raw
    /// payload serialized per `raw_format` when `raw` is set.
    #[instrument(skip(self, request), fields(url = %request.url, raw = request.raw))]
    pub async fn fetch(&self, request: &FetchRequest) -> Result<String> {
        let operation = if request.raw { "fetch_raw" } else { "fetch" };
        let start = Instant::now();
        let result = self.fetch_inner(request).await;
        Self::record_request(operation, start, result.is_ok());
        result
    }

    /// Resolve a request's raw oEmbed payload, bypassing handlers, the
    /// cache, and sanitization.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn fetch_raw(&self, request: &FetchRequest) -> Result<OembedResponse> {
        request.validate()?;
        let endpoint = self
            .resolve_endpoint(
                &request.url,
                request.discover,
                request.response_size_limit,
                None,
            )
            .await?;
        self.endpoint_client
            .fetch(&endpoint, &request.url, request.width, request.height)
            .await
    }

    /// Match a URL to a provider endpoint without fetching the payload.
    #[instrument(skip(self, options), fields(url = %url))]
    pub async fn match_provider(&self, url: &str, options: &ProviderMatchOptions) -> Result<String> {
        let start = Instant::now();
        let result = async {
            options.validate()?;
            self.resolve_endpoint(
                url,
                options.discover,
                options.response_size_limit,
                options.link_type,
            )
            .await
        }
        .await;
        Self::record_request("match", start, result.is_ok());
        result
    }

    /// Reverse cache lookup: the scope owning a cached rendering for this
    /// URL and attribute set, or `None` when not cached.
    pub fn cache_find(
        &self,
        url: &str,
        width: Option<u32>,
        height: Option<u32>,
        discover: Option<bool>,
    ) -> Option<Scope> {
        self.cache
            .find(request_signature(url, width, height, discover))
    }

    /// Drop all cached renderings for a scope. Returns the number removed.
    pub fn cache_clear(&self, scope: Scope) -> u64 {
        self.cache.invalidate_scope(scope)
    }

    async fn fetch_inner(&self, request: &FetchRequest) -> Result<String> {
        request.validate()?;

        if request.raw {
            let payload = self.fetch_raw(request).await?;
            let value = payload.to_json_value();
            return match request.raw_format.unwrap_or_default() {
                RawFormat::Json => serde_json::to_string(&value).map_err(UnfurlError::from),
                RawFormat::Xml => xml::payload_to_xml(&value),
            };
        }

        if let Some(output) = self.handlers.render(&request.url) {
            debug!("handler matched");
            return Ok(self.finish_handler_output(output, request));
        }

        let scope = Scope::from(request.post_id);
        let signature = request_signature(
            &request.url,
            request.width,
            request.height,
            request.discover_explicit.then_some(request.discover),
        );

        if !request.skip_cache {
            if let Some(html) = self.cache.get(scope, signature) {
                debug!("cache hit");
                return Ok(html);
            }
        }

        let endpoint = self
            .resolve_endpoint(
                &request.url,
                request.discover,
                request.response_size_limit,
                None,
            )
            .await?;
        let payload = self
            .endpoint_client
            .fetch(&endpoint, &request.url, request.width, request.height)
            .await?;

        let html = payload.render_html(&request.url).ok_or_else(|| {
            UnfurlError::Fetch("provider response contained no embeddable content".into())
        })?;
        let html = if request.skip_sanitization {
            html
        } else {
            sanitize::scrub_html(&html)
        };

        let ttl = if request.skip_cache {
            Duration::ZERO
        } else {
            payload
                .cache_age_secs()
                .map(Duration::from_secs)
                .unwrap_or(self.default_ttl)
        };
        self.cache.put(scope, signature, html.clone(), ttl);

        Ok(html)
    }

    /// Resolve an endpoint via the provider table, falling back to
    /// discovery when enabled.
    async fn resolve_endpoint(
        &self,
        url: &str,
        discover: bool,
        size_limit: Option<usize>,
        link_type: Option<LinkType>,
    ) -> Result<String> {
        if let Some(endpoint) = self.providers.match_url(url) {
            return Ok(endpoint.to_string());
        }
        if !discover {
            return Err(UnfurlError::NoProvider {
                discovery_attempted: false,
            });
        }
        let size_limit = size_limit.unwrap_or(DEFAULT_RESPONSE_SIZE_LIMIT);
        match self.discovery.discover(url, size_limit, link_type).await? {
            Some(endpoint) => Ok(endpoint),
            None => Err(UnfurlError::NoProvider {
                discovery_attempted: true,
            }),
        }
    }

    /// Apply placeholder expansion policy to handler output.
    fn finish_handler_output(&self, output: HandlerOutput, request: &FetchRequest) -> String {
        match output {
            HandlerOutput::Rendered(html) => html,
            HandlerOutput::NeedsExpansion(placeholder) => {
                match (&self.expander, request.expand_placeholders) {
                    (Some(expander), true) => expander(&placeholder),
                    _ => placeholder,
                }
            }
        }
    }

    /// Record request outcome metrics (counter + histogram).
    fn record_request(operation: &'static str, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "operation" => operation,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "operation" => operation,
        )
        .record(start.elapsed().as_secs_f64());
    }
}
