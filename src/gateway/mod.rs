//! Gateway construction and orchestration

mod builder;
mod engine;

pub use builder::{PlaceholderExpander, Unfurl, UnfurlBuilder};
pub use engine::EmbedGateway;
