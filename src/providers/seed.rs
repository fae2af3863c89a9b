//! Built-in provider table.
//!
//! `(pattern, endpoint, is_regex)` rows, tried in order. Non-regex rows
//! are asterisk-wildcard masks. Endpoints may carry a `{format}`
//! placeholder substituted at fetch time.

pub(crate) const BUILTIN_PROVIDERS: &[(&str, &str, bool)] = &[
    (
        r"https?://((m|www)\.)?youtube\.com/watch.*",
        "https://www.youtube.com/oembed",
        true,
    ),
    (
        r"https?://((m|www)\.)?youtube\.com/playlist.*",
        "https://www.youtube.com/oembed",
        true,
    ),
    (
        r"https?://((m|www)\.)?youtube\.com/shorts/.*",
        "https://www.youtube.com/oembed",
        true,
    ),
    (
        r"https?://youtu\.be/.*",
        "https://www.youtube.com/oembed",
        true,
    ),
    (
        r"https?://vimeo\.com/.*",
        "https://vimeo.com/api/oembed.{format}",
        true,
    ),
    (
        r"https?://(www\.)?dailymotion\.com/.*",
        "https://www.dailymotion.com/services/oembed",
        true,
    ),
    (
        r"https?://dai\.ly/.*",
        "https://www.dailymotion.com/services/oembed",
        true,
    ),
    (
        r"https?://flic\.kr/.*",
        "https://www.flickr.com/services/oembed/",
        true,
    ),
    (
        r"https?://(www\.)?flickr\.com/.*",
        "https://www.flickr.com/services/oembed/",
        true,
    ),
    (
        "https://soundcloud.com/*",
        "https://soundcloud.com/oembed",
        false,
    ),
    (
        r"https?://(open|play)\.spotify\.com/.*",
        "https://embed.spotify.com/oembed/",
        true,
    ),
    (
        r"https?://(www\.)?mixcloud\.com/.*",
        "https://app.mixcloud.com/oembed/",
        true,
    ),
    (
        r"https?://(www\.)?ted\.com/talks/.*",
        "https://www.ted.com/services/v1/oembed.{format}",
        true,
    ),
    (
        r"https?://(www\.)?twitter\.com/\w{1,15}/status(es)?/.*",
        "https://publish.twitter.com/oembed",
        true,
    ),
    (
        r"https?://(www\.)?tiktok\.com/.*/video/.*",
        "https://www.tiktok.com/oembed",
        true,
    ),
    (
        r"https?://(www\.)?reddit\.com/r/[^/]+/comments/.*",
        "https://www.reddit.com/oembed",
        true,
    ),
    (
        r"https?://(www\.)?scribd\.com/(doc|document)/.*",
        "https://www.scribd.com/services/oembed",
        true,
    ),
    (
        r"https?://(www\.)?kickstarter\.com/projects/.*",
        "https://www.kickstarter.com/services/oembed",
        true,
    ),
    (
        "https://*.tumblr.com/post/*",
        "https://www.tumblr.com/oembed/1.0",
        false,
    ),
    (
        r"https?://(.+\.)?imgur\.com/.*",
        "https://api.imgur.com/oembed",
        true,
    ),
];
