//! Response cache for resolved embeds.
//!
//! [`ResponseCache`] maps `(scope, request signature)` to a cached
//! rendering with a per-entry TTL. Expiry is checked lazily on read — an
//! expired entry reads as absent — while moka's capacity bound keeps the
//! store compact. A zero TTL marks an entry as never reusable, which is
//! how skip-cache mode writes without special-casing the read path.
//!
//! # Signatures
//!
//! The request signature hashes the URL plus a canonical, fixed-order
//! encoding of the attributes the caller actually set (width, height,
//! discover). Insertion order cannot influence the key because the
//! encoding order is fixed in code; logically identical requests always
//! produce identical signatures.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use moka::sync::Cache;

use crate::telemetry;

/// Default maximum number of cached entries.
const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Default TTL applied when a provider response advertises none: one day.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600);

/// Configuration for the response cache.
///
/// ```rust
/// # use unfurl::cache::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(50_000)
///     .default_ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// TTL used when a response advertises no `cache_age`. Default: 1 day.
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the TTL used when a response advertises none.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

/// Cache-ownership unit: a specific post, or the global bucket for
/// unscoped requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Post(u64),
}

impl From<Option<u64>> for Scope {
    fn from(post_id: Option<u64>) -> Self {
        match post_id {
            Some(id) => Scope::Post(id),
            None => Scope::Global,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Post(id) => write!(f, "{id}"),
        }
    }
}

/// Key for one cached rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    scope: Scope,
    signature: u64,
}

/// A cached rendering with its expiry bookkeeping.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: String,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Expired iff `ttl == 0 || now - stored_at > ttl`.
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl.is_zero() || now.duration_since(self.stored_at) > self.ttl
    }
}

/// In-memory response cache keyed on `(scope, signature)`.
///
/// Thread-safe; `put` is atomic with respect to concurrent `get`s on the
/// same key (moka handles synchronization internally).
pub struct ResponseCache {
    cache: Cache<CacheKey, CacheEntry>,
}

impl ResponseCache {
    /// Create a cache from the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder().max_capacity(config.max_entries).build();
        Self { cache }
    }

    /// Look up a cached rendering.
    ///
    /// Returns `None` when absent or expired. Emits hit/miss metrics.
    pub fn get(&self, scope: Scope, signature: u64) -> Option<String> {
        let key = CacheKey { scope, signature };
        match self.live_entry(&key) {
            Some(entry) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(entry.payload)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert or overwrite a rendering. A zero `ttl` stores a marker that
    /// can never be read back.
    pub fn put(&self, scope: Scope, signature: u64, payload: impl Into<String>, ttl: Duration) {
        let key = CacheKey { scope, signature };
        let entry = CacheEntry {
            payload: payload.into(),
            stored_at: Instant::now(),
            ttl,
        };
        self.cache.insert(key, entry);
    }

    /// Drop every entry belonging to a scope. Returns the number removed.
    pub fn invalidate_scope(&self, scope: Scope) -> u64 {
        // Flush buffered writes so the iterator sees recent inserts.
        self.cache.run_pending_tasks();
        let mut removed = 0;
        for (key, _) in self.cache.iter() {
            if key.scope == scope {
                self.cache.invalidate(&*key);
                removed += 1;
            }
        }
        removed
    }

    /// Best-effort reverse lookup: the scope owning a live entry for this
    /// signature, or `None` if it is not cached anywhere. Post scopes win
    /// over the global bucket when both hold the signature.
    pub fn find(&self, signature: u64) -> Option<Scope> {
        // Flush buffered writes so the iterator sees recent inserts.
        self.cache.run_pending_tasks();
        let now = Instant::now();
        let mut global_hit = None;
        for (key, entry) in self.cache.iter() {
            if key.signature != signature || entry.is_expired(now) {
                continue;
            }
            match key.scope {
                Scope::Post(_) => return Some(key.scope),
                Scope::Global => global_hit = Some(key.scope),
            }
        }
        global_hit
    }

    /// Number of entries currently stored, expired markers included.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Fetch an entry and apply lazy expiry, evicting expired markers.
    fn live_entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.cache.get(key)?;
        if entry.is_expired(Instant::now()) {
            self.cache.invalidate(key);
            return None;
        }
        Some(entry)
    }
}

/// Compute a request signature from the URL and the set attributes.
///
/// Uses `DefaultHasher` (SipHash) — deterministic within a process
/// lifetime, which is sufficient for an in-memory cache. Attributes are
/// folded in a fixed order; unset attributes contribute a distinct "unset"
/// marker so `width=None` and `width=0` cannot collide.
pub fn request_signature(
    url: &str,
    width: Option<u32>,
    height: Option<u32>,
    discover: Option<bool>,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    width.hash(&mut hasher);
    height.hash(&mut hasher);
    discover.hash(&mut hasher);
    hasher.finish()
}
