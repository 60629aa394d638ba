//! media-resolver - media identifier resolver and cached metadata client
//!
//! Fronts an Instagram-style content platform: translates between media
//! identifier encodings and retrieves media metadata through several
//! fallback paths, caching the result per client.
//!
//! # Architecture
//!
//! - Identifiers are normalized offline (pk, composite id, short code, URL)
//! - Metadata is fetched through an ordered chain of strategies
//!   (public graph, then private API) behind a `Transport` trait
//! - Results are cached per client; mutations evict before they are sent
//!
//! # Modules
//!
//! - `identifiers`: Short code codec and identifier normalization
//! - `core`: Fetch strategies, cache, session and the `MediaClient` facade
//! - `adapters`: Transport trait and its HTTP implementation
//! - `extract`: Raw JSON to domain types
//! - `domain`: Data structures (Media, UserShort, Location, EmbedInfo)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Resolve a URL to a primary key
//! media-resolver pk https://www.instagram.com/p/B1LbfVPlwIA/
//!
//! # Show media metadata
//! MEDIA_RESOLVER_SESSIONID=... media-resolver info B1LbfVPlwIA
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod extract;
pub mod identifiers;

// Re-export main types at crate root for convenience
pub use adapters::{HttpTransport, Transport};
pub use crate::core::{MediaCache, MediaClient, MediaFetcher, Session, Strategy};
pub use domain::{EmbedInfo, Location, Media, MediaType, ProductType, UserShort, Usertag};
pub use error::{Error, Result};
pub use identifiers::MediaRef;
