//! Provider table: pattern-to-endpoint matching for oEmbed resolution.
//!
//! The registry holds an ordered list of `(pattern, endpoint)` entries.
//! Wildcard patterns are compiled to case-insensitive regexes at
//! registration time; lookups try entries in registration order and the
//! first match wins. A built-in seed table covers well-known providers;
//! further entries can be registered at runtime or loaded from a TOML file.

mod file;
mod registry;
mod seed;

pub use file::ProvidersFile;
pub use registry::{ProviderEntry, ProviderListing, ProviderPattern, ProviderRegistry};
