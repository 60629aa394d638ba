//! Core media logic.
//!
//! This module contains:
//! - MediaCache: in-process metadata cache
//! - MediaFetcher: retrieval strategies and their fallback chain
//! - Session: acting identity for mutations
//! - MediaClient: public surface composing the above

pub mod cache;
pub mod client;
pub mod fetcher;
pub mod session;

// Re-export commonly used types
pub use cache::MediaCache;
pub use client::MediaClient;
pub use fetcher::{MediaFetcher, Strategy, FALLBACK_CHAIN, GRAPH_QUERY_HASH};
pub use session::Session;
