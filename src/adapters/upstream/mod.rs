//! Upstream Adapters - Third-party Games Feed over HTTP
//!
//! Implements the `GameSource` port: a reqwest client with bounded
//! retry/backoff plus the decoder that turns the feed payload into
//! `RawGameDescriptor`s.

pub mod client;
pub mod games;

pub use client::FeedClient;
pub use games::GamesFeed;
