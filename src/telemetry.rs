//! Telemetry metric name constants.
//!
//! Centralised metric names for unfurl operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `unfurl_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation` — gateway operation (e.g. "fetch", "fetch_raw", "match")
//! - `path` — resolution path taken: "handler", "provider", "discovery"
//! - `status` — outcome: "ok" or "error"

/// Total fetch/match requests dispatched through the gateway.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "unfurl_requests_total";

/// Request duration in seconds.
///
/// Labels: `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "unfurl_request_duration_seconds";

/// Total cache hits on the response cache.
pub const CACHE_HITS_TOTAL: &str = "unfurl_cache_hits_total";

/// Total cache misses on the response cache.
pub const CACHE_MISSES_TOTAL: &str = "unfurl_cache_misses_total";

/// Total discovery page fetches attempted.
///
/// Labels: `status` ("ok" | "error").
pub const DISCOVERY_FETCHES_TOTAL: &str = "unfurl_discovery_fetches_total";
