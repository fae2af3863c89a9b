//! Built-in handlers for direct links to media files.
//!
//! Both return bracketed placeholders rather than final HTML; the gateway
//! expands them only when the request asks for expansion and an expander
//! is configured.

use super::{EmbedHandler, HandlerOutput};

/// URLs ending in an audio file extension (query string allowed).
pub(crate) const AUDIO_URL_REGEX: &str =
    r#"^https?://[^\s"']+\.(mp3|ogg|flac|m4a|wav)(\?.*)?$"#;

/// URLs ending in a video file extension (query string allowed).
pub(crate) const VIDEO_URL_REGEX: &str =
    r#"^https?://[^\s"']+\.(mp4|m4v|webm|ogv|mov|flv)(\?.*)?$"#;

/// Renders direct audio links as an `[audio]` placeholder.
pub struct AudioFileHandler;

impl EmbedHandler for AudioFileHandler {
    fn name(&self) -> &str {
        "audio_file"
    }

    fn render(&self, url: &str, _captures: &regex::Captures<'_>) -> HandlerOutput {
        HandlerOutput::NeedsExpansion(format!("[audio src=\"{url}\"]"))
    }
}

/// Renders direct video links as a `[video]` placeholder.
pub struct VideoFileHandler;

impl EmbedHandler for VideoFileHandler {
    fn name(&self) -> &str {
        "video_file"
    }

    fn render(&self, url: &str, _captures: &regex::Captures<'_>) -> HandlerOutput {
        HandlerOutput::NeedsExpansion(format!("[video src=\"{url}\"]"))
    }
}

/// Expand the built-in `[audio]`/`[video]` placeholders into HTML media
/// elements. Text that is not such a placeholder passes through verbatim.
pub fn expand_media_placeholder(placeholder: &str) -> String {
    use std::sync::OnceLock;
    static PLACEHOLDER: OnceLock<regex::Regex> = OnceLock::new();
    let pattern = PLACEHOLDER.get_or_init(|| {
        regex::Regex::new(r#"^\[(audio|video) src="([^"]+)"\]$"#)
            .expect("placeholder regex compiles")
    });

    match pattern.captures(placeholder) {
        Some(captures) => {
            let element = &captures[1];
            let src = &captures[2];
            format!("<{element} controls src=\"{src}\"></{element}>")
        }
        None => placeholder.to_string(),
    }
}
