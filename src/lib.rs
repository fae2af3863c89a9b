//! Unfurl - oEmbed resolution engine
//!
//! This crate resolves URLs into embeddable HTML via the oEmbed protocol:
//! locally registered handlers are consulted first, then a pattern-matched
//! provider table with HTML link discovery as fallback, with resolved
//! renderings held in a TTL'd response cache.
//!
//! # Fetch Example
//!
//! ```rust,no_run
//! use unfurl::{FetchRequest, Unfurl};
//!
//! #[tokio::main]
//! async fn main() -> unfurl::Result<()> {
//!     let gateway = Unfurl::builder().build()?;
//!
//!     let html = gateway
//!         .fetch(&FetchRequest::new("https://youtu.be/dQw4w9WgXcQ").width(500))
//!         .await?;
//!
//!     println!("{html}");
//!     Ok(())
//! }
//! ```
//!
//! # Provider Matching Example
//!
//! ```rust,no_run
//! use unfurl::{ProviderMatchOptions, Unfurl};
//!
//! #[tokio::main]
//! async fn main() -> unfurl::Result<()> {
//!     let gateway = Unfurl::builder().build()?;
//!
//!     let endpoint = gateway
//!         .match_provider(
//!             "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!             &ProviderMatchOptions::new(),
//!         )
//!         .await?;
//!
//!     println!("{endpoint}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod oembed;
pub mod providers;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use error::{Result, UnfurlError};
pub use gateway::{EmbedGateway, PlaceholderExpander, Unfurl, UnfurlBuilder};
pub use version::PKG_VERSION;

// Re-export the request/option surface
pub use cache::{CacheConfig, Scope};
pub use handlers::{EmbedHandler, HandlerOutput, HandlerRegistry};
pub use oembed::OembedResponse;
pub use providers::{ProviderPattern, ProviderRegistry};
pub use types::{FetchRequest, LinkType, ProviderMatchOptions, RawFormat};
