//! oEmbed endpoint discovery.
//!
//! When no provider pattern matches a URL, the target page itself may
//! advertise an endpoint via `<link rel="alternate" type="…+oembed">`
//! tags. The resolver fetches the page with a strict size bound —
//! terminating the read as soon as the limit is consumed — and scans the
//! retrieved prefix for discovery links, preferring JSON over XML.

use std::sync::OnceLock;
use std::time::Duration;

use futures_util::StreamExt;
use regex::{Regex, RegexBuilder};
use tracing::{debug, instrument};
use url::Url;

use crate::types::LinkType;
use crate::{telemetry, Result, UnfurlError};

/// Default bound on discovery page reads: 150 KB.
pub const DEFAULT_RESPONSE_SIZE_LIMIT: usize = 150 * 1024;

/// Default timeout for discovery and endpoint fetches.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Discovery links found in a page, at most one per link type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct DiscoveredLinks {
    pub json: Option<String>,
    pub xml: Option<String>,
}

impl DiscoveredLinks {
    /// Pick the endpoint honoring an optional link-type restriction;
    /// JSON wins when both are present and no restriction applies.
    pub fn select(self, link_type: Option<LinkType>) -> Option<String> {
        match link_type {
            Some(LinkType::Json) => self.json,
            Some(LinkType::Xml) => self.xml,
            None => self.json.or(self.xml),
        }
    }
}

/// Resolves oEmbed endpoints by scanning target pages for discovery links.
pub struct DiscoveryResolver {
    http: reqwest::Client,
}

impl DiscoveryResolver {
    /// Create a resolver using the given HTTP client.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch `url` (reading at most `size_limit` bytes) and scan for an
    /// oEmbed endpoint.
    ///
    /// Returns `Ok(None)` when the page yields no usable link; the caller
    /// decides whether that is a hard failure. Assumes discovery is
    /// enabled — option validation happens before this is invoked.
    #[instrument(skip(self))]
    pub async fn discover(
        &self,
        url: &str,
        size_limit: usize,
        link_type: Option<LinkType>,
    ) -> Result<Option<String>> {
        let html = match self.fetch_bounded(url, size_limit).await {
            Ok(html) => {
                metrics::counter!(telemetry::DISCOVERY_FETCHES_TOTAL, "status" => "ok")
                    .increment(1);
                html
            }
            Err(e) => {
                metrics::counter!(telemetry::DISCOVERY_FETCHES_TOTAL, "status" => "error")
                    .increment(1);
                return Err(e);
            }
        };

        let links = scan_for_oembed_links(&html);
        debug!(json = ?links.json, xml = ?links.xml, "discovery links");
        Ok(links
            .select(link_type)
            .map(|href| resolve_href(url, &href)))
    }

    /// GET the page, consuming the body incrementally and stopping as
    /// soon as `size_limit` bytes have been read.
    async fn fetch_bounded(&self, url: &str, size_limit: usize) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UnfurlError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UnfurlError::Fetch(format!(
                "discovery target returned HTTP {status}"
            )));
        }

        let mut body: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| UnfurlError::Fetch(e.to_string()))?;
            let remaining = size_limit.saturating_sub(body.len());
            if remaining == 0 {
                break;
            }
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Scan HTML for oEmbed discovery links, keeping the first link of each
/// type in document order.
pub(crate) fn scan_for_oembed_links(html: &str) -> DiscoveredLinks {
    static LINK_TAG: OnceLock<Regex> = OnceLock::new();
    let link_tag = LINK_TAG.get_or_init(|| {
        RegexBuilder::new(r"<link([^<>]+)>")
            .case_insensitive(true)
            .build()
            .expect("link tag regex compiles")
    });

    let mut links = DiscoveredLinks::default();
    for tag in link_tag.captures_iter(html) {
        let attrs = parse_attributes(&tag[1]);

        let Some(rel) = attrs.rel else {
            continue;
        };
        if !rel
            .split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("alternate"))
        {
            continue;
        }

        let Some(content_type) = attrs.content_type else {
            continue;
        };
        let link_type = match content_type.to_ascii_lowercase().as_str() {
            "application/json+oembed" => LinkType::Json,
            "text/xml+oembed" | "application/xml+oembed" => LinkType::Xml,
            _ => continue,
        };

        let Some(href) = attrs.href else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        match link_type {
            LinkType::Json if links.json.is_none() => links.json = Some(href),
            LinkType::Xml if links.xml.is_none() => links.xml = Some(href),
            _ => {}
        }

        if links.json.is_some() && links.xml.is_some() {
            break;
        }
    }
    links
}

/// The attributes of a `<link>` tag that discovery cares about.
#[derive(Debug, Default)]
struct LinkAttributes {
    rel: Option<String>,
    content_type: Option<String>,
    href: Option<String>,
}

/// Pull rel/type/href out of a tag's attribute text. Values may be
/// double-quoted, single-quoted, or bare.
fn parse_attributes(attrs: &str) -> LinkAttributes {
    static ATTR: OnceLock<Regex> = OnceLock::new();
    let attr = ATTR.get_or_init(|| {
        RegexBuilder::new(r#"([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .case_insensitive(true)
            .build()
            .expect("attribute regex compiles")
    });

    let mut parsed = LinkAttributes::default();
    for captures in attr.captures_iter(attrs) {
        let value = captures
            .get(2)
            .or_else(|| captures.get(3))
            .or_else(|| captures.get(4))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        // First occurrence of an attribute wins.
        match captures[1].to_ascii_lowercase().as_str() {
            "rel" if parsed.rel.is_none() => parsed.rel = Some(value),
            "type" if parsed.content_type.is_none() => parsed.content_type = Some(value),
            "href" if parsed.href.is_none() => parsed.href = Some(value),
            _ => {}
        }
    }
    parsed
}

/// Resolve a possibly-relative href against the page URL.
fn resolve_href(page_url: &str, href: &str) -> String {
    match Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}
