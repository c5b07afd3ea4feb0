//! # mapnotes-feed
//!
//! Region-scoped notes feed for the map notes layer.
//!
//! This crate provides:
//! - A streaming parser for the notes XML feed
//! - A fail-soft HTTP fetcher for bounding-box queries
//! - A viewport-keyed cache that refetches only when the view moves away
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mapnotes_feed::{FeedConfig, NoteFetcher, ViewportCache};
//!
//! let fetcher = Arc::new(NoteFetcher::new(&FeedConfig::from_env())?);
//! let cache = ViewportCache::new(fetcher, tokio::runtime::Handle::current());
//!
//! // On every frame
//! cache.query_new_data(&viewport);
//! if let Some(notes) = cache.results() {
//!     // draw notes
//! }
//! ```

pub mod cache;
pub mod config;
pub mod fetcher;
pub mod parser;

pub use cache::{ViewportCache, ViewportKey};
pub use config::{ConfigError, FeedConfig};
pub use fetcher::NoteFetcher;
pub use parser::{parse_notes, parse_notes_str};
