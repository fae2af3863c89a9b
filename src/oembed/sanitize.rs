//! Conservative HTML scrubbing for provider output.
//!
//! Providers return arbitrary third-party HTML. The scrubber removes the
//! two highest-risk constructs — `<script>` elements and inline event
//! handlers — and leaves everything else alone. It is deliberately not a
//! full sanitizer; callers embedding output in a strict context should
//! layer their own policy on top, or bypass this one entirely via
//! skip-sanitization.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

/// Strip `<script>` elements (with their content) and inline `on*=`
/// event-handler attributes.
pub(crate) fn scrub_html(html: &str) -> String {
    static SCRIPT: OnceLock<Regex> = OnceLock::new();
    static EVENT_ATTR: OnceLock<Regex> = OnceLock::new();

    let script = SCRIPT.get_or_init(|| {
        RegexBuilder::new(r"<script\b[^>]*>.*?</script\s*>|<script\b[^>]*/?>")
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .expect("script regex compiles")
    });
    let event_attr = EVENT_ATTR.get_or_init(|| {
        RegexBuilder::new(r#"\son[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
            .case_insensitive(true)
            .build()
            .expect("event attribute regex compiles")
    });

    let without_scripts = script.replace_all(html, "");
    event_attr.replace_all(&without_scripts, "").into_owned()
}

/// Escape text for use inside an HTML/XML attribute value.
pub(crate) fn escape_attr(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Escape text for use as HTML/XML element content.
pub(crate) fn escape_text(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}
