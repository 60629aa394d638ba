//! Transport interfaces for the media platform.
//!
//! The core never builds HTTP requests itself. It calls into a [`Transport`],
//! which owns endpoints, headers and session cookies, and hands back raw
//! JSON for the extractors.

pub mod http;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::Location;
use crate::error::Result;

// Re-export the HTTP transport
pub use http::HttpTransport;

/// Form payload for private requests
pub type Payload = Map<String, Value>;

/// Raw request channels of the platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Unauthenticated public page request (`/p/<code>/` and similar).
    ///
    /// Fails with `NotFound` or `Transport`.
    async fn public_anonymous_fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<Value>;

    /// Public structured-query request.
    ///
    /// Fails with `LoginRequired` when the public channel has no session
    /// with enough privileges.
    async fn public_graph_fetch(&self, variables: &Value, query_hash: &str) -> Result<Value>;

    /// Authenticated private API request; POST when `data` is given
    async fn private_fetch(&self, endpoint: &str, data: Option<&Payload>) -> Result<Value>;

    /// Fill in coordinates and address of a partial location
    async fn resolve_location(&self, location: Location) -> Result<Location>;

    /// Copy the private session onto the public channel.
    ///
    /// Returns false when there is no session to inject.
    async fn inject_ambient_session(&self) -> bool;
}
