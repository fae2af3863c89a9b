//! Tests for [`ResponseCache`] — TTL semantics, scoping, reverse lookup.

use std::time::Duration;

use unfurl::cache::{request_signature, CacheConfig, ResponseCache, Scope};

fn cache() -> ResponseCache {
    ResponseCache::new(&CacheConfig::new().max_entries(1_000))
}

#[test]
fn expired_entries_read_as_absent_for_any_ttl() {
    let cache = cache();

    // ttl = 0: immediately unreadable.
    cache.put(Scope::Global, 1, "a", Duration::ZERO);
    assert!(cache.get(Scope::Global, 1).is_none());

    // short ttl: readable now, absent after expiry.
    cache.put(Scope::Global, 2, "b", Duration::from_millis(10));
    assert_eq!(cache.get(Scope::Global, 2).as_deref(), Some("b"));
    std::thread::sleep(Duration::from_millis(40));
    assert!(cache.get(Scope::Global, 2).is_none());

    // long ttl: stays readable.
    cache.put(Scope::Global, 3, "c", Duration::from_secs(3600));
    assert_eq!(cache.get(Scope::Global, 3).as_deref(), Some("c"));
}

#[test]
fn skip_cache_marker_is_never_reusable() {
    // put with ttl = 0 followed immediately by get returns empty — the
    // skip-cache write path needs no special-casing on read.
    let cache = cache();
    cache.put(Scope::Post(5), 9, "<iframe/>", Duration::ZERO);
    assert!(cache.get(Scope::Post(5), 9).is_none());
}

#[test]
fn overwrite_replaces_payload_and_ttl() {
    let cache = cache();
    cache.put(Scope::Global, 1, "old", Duration::ZERO);
    cache.put(Scope::Global, 1, "new", Duration::from_secs(60));
    assert_eq!(cache.get(Scope::Global, 1).as_deref(), Some("new"));
}

#[test]
fn signature_is_insensitive_to_construction_path() {
    // Logically identical requests must hit the same key however the
    // caller assembled its attributes.
    let a = request_signature("https://example.com/v", Some(500), Some(300), Some(true));
    let b = request_signature("https://example.com/v", Some(500), Some(300), Some(true));
    assert_eq!(a, b);

    // Any attribute difference changes the key.
    assert_ne!(
        a,
        request_signature("https://example.com/v", Some(500), Some(300), None)
    );
    assert_ne!(
        a,
        request_signature("https://example.com/w", Some(500), Some(300), Some(true))
    );
}

#[test]
fn find_returns_owning_scope_until_invalidated() {
    let cache = cache();
    let signature = request_signature("https://example.com/v", Some(500), None, None);

    cache.put(Scope::Post(123), signature, "<iframe/>", Duration::from_secs(60));
    assert_eq!(cache.find(signature), Some(Scope::Post(123)));

    cache.invalidate_scope(Scope::Post(123));
    assert!(cache.find(signature).is_none());
}

#[test]
fn invalidate_scope_leaves_other_scopes_alone() {
    let cache = cache();
    cache.put(Scope::Post(1), 10, "one", Duration::from_secs(60));
    cache.put(Scope::Post(2), 20, "two", Duration::from_secs(60));
    cache.put(Scope::Global, 30, "g", Duration::from_secs(60));

    assert_eq!(cache.invalidate_scope(Scope::Post(1)), 1);
    assert!(cache.get(Scope::Post(1), 10).is_none());
    assert_eq!(cache.get(Scope::Post(2), 20).as_deref(), Some("two"));
    assert_eq!(cache.get(Scope::Global, 30).as_deref(), Some("g"));
}

#[test]
fn clear_drops_everything() {
    let cache = cache();
    cache.put(Scope::Post(1), 1, "a", Duration::from_secs(60));
    cache.put(Scope::Global, 2, "b", Duration::from_secs(60));
    cache.clear();
    assert!(cache.get(Scope::Post(1), 1).is_none());
    assert!(cache.get(Scope::Global, 2).is_none());
}

#[test]
fn concurrent_readers_never_observe_torn_entries() {
    use std::sync::Arc;
    use std::thread;

    let cache = Arc::new(cache());
    let payload = "x".repeat(4096);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let payload = payload.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                cache.put(Scope::Global, 7, payload.clone(), Duration::from_secs(60));
            }
        }));
    }
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let payload = payload.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                if let Some(read) = cache.get(Scope::Global, 7) {
                    assert_eq!(read, payload);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }
}
