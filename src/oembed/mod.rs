//! oEmbed payloads: fetching, rendering, and serialization.
//!
//! [`OembedResponse`] models the provider payload loosely — the protocol's
//! field typing is inconsistent across providers (dimensions and
//! `cache_age` arrive as numbers or strings), so known fields are typed
//! permissively and everything else is preserved verbatim for raw output.

mod client;
pub(crate) mod sanitize;
pub(crate) mod xml;

pub use client::EndpointClient;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A provider's oEmbed response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OembedResponse {
    /// Resource type: `video`, `rich`, `photo`, or `link`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Value>,
    /// Suggested cache lifetime in seconds; number or numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<Value>,
    /// All remaining payload fields, preserved for raw output.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl OembedResponse {
    /// The advertised cache lifetime in seconds, when parseable.
    pub fn cache_age_secs(&self) -> Option<u64> {
        match self.cache_age.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Render the payload as embed HTML.
    ///
    /// `video`/`rich` payloads (and anything else carrying `html`) return
    /// the `html` field; `photo` renders an `<img>` tag and `link` an
    /// `<a>` tag. Returns `None` when the payload has nothing usable.
    pub fn render_html(&self, original_url: &str) -> Option<String> {
        match self.kind.as_deref() {
            Some("photo") => {
                let src = self.url.as_deref()?;
                if src.is_empty() {
                    return None;
                }
                let alt = self.title.as_deref().unwrap_or_default();
                let mut img = format!(
                    "<img src=\"{}\" alt=\"{}\"",
                    sanitize::escape_attr(src),
                    sanitize::escape_attr(alt)
                );
                if let Some(width) = dimension(&self.width) {
                    img.push_str(&format!(" width=\"{width}\""));
                }
                if let Some(height) = dimension(&self.height) {
                    img.push_str(&format!(" height=\"{height}\""));
                }
                img.push_str(" />");
                Some(img)
            }
            Some("link") => {
                let href = self.url.as_deref().unwrap_or(original_url);
                let text = self.title.as_deref().unwrap_or(href);
                Some(format!(
                    "<a href=\"{}\">{}</a>",
                    sanitize::escape_attr(href),
                    sanitize::escape_text(text)
                ))
            }
            // video, rich, and lenient fallback for typeless payloads
            _ => self.html.clone().filter(|html| !html.is_empty()),
        }
    }

    /// The payload as a JSON value (raw output).
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Render a loosely-typed dimension as attribute text.
fn dimension(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(sanitize::escape_attr(s).into_owned()),
        _ => None,
    }
}
