//! HTTP client for oEmbed endpoints.

use tracing::instrument;
use url::Url;

use super::OembedResponse;
use crate::{Result, UnfurlError};

/// Fetches oEmbed payloads from provider endpoints.
pub struct EndpointClient {
    http: reqwest::Client,
}

impl EndpointClient {
    /// Create a client using the given HTTP client.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch the JSON payload for `target_url` from `endpoint`.
    ///
    /// A literal `{format}` placeholder in the endpoint is substituted,
    /// and the `url`, `format`, and dimension query parameters are set,
    /// replacing any present on the endpoint already (discovery links
    /// often arrive with `url` baked in).
    #[instrument(skip(self))]
    pub async fn fetch(
        &self,
        endpoint: &str,
        target_url: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<OembedResponse> {
        let request_url = build_request_url(endpoint, target_url, width, height)?;

        let response = self
            .http
            .get(request_url)
            .send()
            .await
            .map_err(|e| UnfurlError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UnfurlError::Fetch(format!(
                "provider returned HTTP {status}"
            )));
        }

        response
            .json::<OembedResponse>()
            .await
            .map_err(|e| UnfurlError::Fetch(format!("invalid oEmbed payload: {e}")))
    }
}

/// Build the endpoint request URL with canonical query parameters.
fn build_request_url(
    endpoint: &str,
    target_url: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Url> {
    let endpoint = endpoint.replace("{format}", "json");
    let mut url = Url::parse(&endpoint)
        .map_err(|e| UnfurlError::Fetch(format!("invalid provider endpoint '{endpoint}': {e}")))?;

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .filter(|(k, _)| !matches!(k.as_str(), "url" | "format" | "maxwidth" | "maxheight"))
        .collect();
    pairs.push(("url".into(), target_url.into()));
    pairs.push(("format".into(), "json".into()));
    if let Some(width) = width {
        pairs.push(("maxwidth".into(), width.to_string()));
    }
    if let Some(height) = height {
        pairs.push(("maxheight".into(), height.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(&pairs).finish();
    Ok(url)
}
