//! Media metadata retrieval strategies and their fallback chain.
//!
//! Three independent strategies:
//! - Anonymous: public page request by short code, no session needed
//! - Graph: public structured query by short code; richest payload
//!   (completed location) but gated for logged-out or restricted sessions
//! - Private: private API by primary key; always reachable with a session
//!
//! The default chain is Graph then Private. A `LoginRequired` from Graph
//! triggers one session injection and one retry; if no session can be
//! injected the chain stops there.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, instrument, warn};

use crate::adapters::Transport;
use crate::domain::Media;
use crate::error::{Error, Result};
use crate::extract::{extract_location, extract_media_gql, extract_media_v1};
use crate::identifiers::codec;

/// Persisted query for `shortcode_media`
pub const GRAPH_QUERY_HASH: &str = "477b65a610463740ccdb83135b2014db";

/// Substring the private API uses in its error message for absent media
const MEDIA_NOT_FOUND_MARKER: &str = "Media not found";

/// One metadata retrieval path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Anonymous,
    Graph,
    Private,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Anonymous => write!(f, "anonymous"),
            Strategy::Graph => write!(f, "graph"),
            Strategy::Private => write!(f, "private"),
        }
    }
}

/// Strategies tried on a cache miss, in order
pub const FALLBACK_CHAIN: [Strategy; 2] = [Strategy::Graph, Strategy::Private];

/// Failed strategy attempt
#[derive(Debug)]
enum Failure {
    /// Move on to the next strategy
    Continue(Error),
    /// Abort the chain with this error
    Stop(Error),
}

/// Media metadata fetcher over a [`Transport`]
pub struct MediaFetcher {
    transport: Arc<dyn Transport>,
}

impl MediaFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch media from the logged-out public page.
    ///
    /// `max_id` is the comment pagination cursor.
    pub async fn media_info_a1(&self, media_pk: u64, max_id: Option<&str>) -> Result<Media> {
        let shortcode = codec::encode(media_pk);
        let params: Vec<(&str, &str)> = max_id.map(|id| ("max_id", id)).into_iter().collect();

        let data = self
            .transport
            .public_anonymous_fetch(&format!("/p/{}/", shortcode), &params)
            .await?;

        let media = shortcode_media(&data).ok_or(Error::MediaNotFound { media_pk })?;
        extract_media_gql(media)
    }

    /// Fetch media through the public graph query
    pub async fn media_info_gql(&self, media_pk: u64) -> Result<Media> {
        let variables = json!({
            "shortcode": codec::encode(media_pk),
            "child_comment_count": 3,
            "fetch_comment_count": 40,
            "parent_comment_count": 24,
            "has_threaded_comments": false,
        });

        let mut data = self
            .transport
            .public_graph_fetch(&variables, GRAPH_QUERY_HASH)
            .await?;

        if shortcode_media(&data).is_none() {
            return Err(Error::MediaNotFound { media_pk });
        }
        let media = &mut data["shortcode_media"];

        let partial = match media.get("location") {
            Some(location) if !location.is_null() => Some(extract_location(location)?),
            _ => None,
        };
        if let Some(partial) = partial {
            let location = self.transport.resolve_location(partial).await?;
            media["location"] = serde_json::to_value(&location)?;
        }

        extract_media_gql(media)
    }

    /// Fetch media from the private API
    pub async fn media_info_v1(&self, media_pk: u64) -> Result<Media> {
        let result = match self
            .transport
            .private_fetch(&format!("media/{}/info/", media_pk), None)
            .await
        {
            Ok(result) => result,
            Err(e) if e.is_not_found() || e.to_string().contains(MEDIA_NOT_FOUND_MARKER) => {
                return Err(Error::MediaNotFound { media_pk })
            }
            Err(e) => return Err(e),
        };

        let item = result
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.last())
            .ok_or(Error::MediaNotFound { media_pk })?;

        extract_media_v1(item)
    }

    /// Fetch media through the default fallback chain
    pub async fn fetch(&self, media_pk: u64) -> Result<Media> {
        self.fetch_with(&FALLBACK_CHAIN, media_pk).await
    }

    /// Fetch media trying `chain` in order until one strategy succeeds.
    ///
    /// Returns the last strategy's error when all of them fail.
    #[instrument(skip(self, chain))]
    pub async fn fetch_with(&self, chain: &[Strategy], media_pk: u64) -> Result<Media> {
        let mut last_error = None;

        for &strategy in chain {
            debug!(%strategy, "Trying strategy");

            match self.attempt(strategy, media_pk).await {
                Ok(media) => {
                    debug!(%strategy, "Strategy succeeded");
                    return Ok(media);
                }
                Err(Failure::Stop(e)) => return Err(e),
                Err(Failure::Continue(e)) => {
                    if e.is_client_error() {
                        debug!(%strategy, error = %e, "Strategy failed");
                    } else {
                        error!(%strategy, error = %e, "Unexpected error from strategy");
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(Error::MediaNotFound { media_pk }))
    }

    async fn attempt(&self, strategy: Strategy, media_pk: u64) -> std::result::Result<Media, Failure> {
        match strategy {
            Strategy::Anonymous => self
                .media_info_a1(media_pk, None)
                .await
                .map_err(Failure::Continue),
            Strategy::Graph => self.graph_with_elevation(media_pk).await,
            Strategy::Private => self.media_info_v1(media_pk).await.map_err(Failure::Continue),
        }
    }

    /// Graph strategy with at most one session injection and retry
    async fn graph_with_elevation(&self, media_pk: u64) -> std::result::Result<Media, Failure> {
        match self.media_info_gql(media_pk).await {
            Ok(media) => Ok(media),
            Err(Error::LoginRequired(reason)) => {
                if !self.transport.inject_ambient_session().await {
                    warn!(%reason, "Graph query needs a session and none can be injected");
                    return Err(Failure::Stop(Error::LoginRequired(reason)));
                }
                warn!(%reason, "Injected session into public requests, retrying graph query");
                self.media_info_gql(media_pk).await.map_err(Failure::Continue)
            }
            Err(e) => Err(Failure::Continue(e)),
        }
    }
}

/// The `shortcode_media` payload, unless missing, null or empty
fn shortcode_media(data: &Value) -> Option<&Value> {
    data.get("shortcode_media").filter(|media| match media {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcode_media_presence() {
        assert!(shortcode_media(&json!({})).is_none());
        assert!(shortcode_media(&json!({"shortcode_media": null})).is_none());
        assert!(shortcode_media(&json!({"shortcode_media": {}})).is_none());
        assert!(shortcode_media(&json!({"shortcode_media": {"id": "1"}})).is_some());
    }

    #[test]
    fn test_default_chain_order() {
        assert_eq!(FALLBACK_CHAIN, [Strategy::Graph, Strategy::Private]);
        assert!(!FALLBACK_CHAIN.contains(&Strategy::Anonymous));
    }
}
