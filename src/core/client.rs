//! Public media client.
//!
//! Composes identifier resolution, the fetch fallback chain and the media
//! cache. Reads go through the cache; mutations evict the affected entry
//! before they are sent.

use std::sync::Arc;

use rand::Rng;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::cache::MediaCache;
use super::fetcher::MediaFetcher;
use super::session::Session;
use crate::adapters::{HttpTransport, Payload, Transport};
use crate::config::ResolvedConfig;
use crate::domain::{EmbedInfo, Location, Media, UserShort, Usertag};
use crate::error::{Error, Result};
use crate::extract::extract_media_oembed;
use crate::identifiers::{compose_id, resolver};

/// Title length used when a long-form caption has no line break
pub const TITLE_MAX_CHARS: usize = 75;

/// Media client for one acting session
pub struct MediaClient {
    transport: Arc<dyn Transport>,
    fetcher: MediaFetcher,
    cache: Arc<MediaCache>,
    session: Session,
}

impl MediaClient {
    /// Create a client with its own empty cache
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self::with_cache(transport, session, Arc::new(MediaCache::new()))
    }

    /// Create a client sharing an existing cache
    pub fn with_cache(transport: Arc<dyn Transport>, session: Session, cache: Arc<MediaCache>) -> Self {
        Self {
            fetcher: MediaFetcher::new(transport.clone()),
            transport,
            cache,
            session,
        }
    }

    /// Create an HTTP-backed client from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(
            Arc::new(transport),
            Session::from_settings(&config.session),
        ))
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn fetcher(&self) -> &MediaFetcher {
        &self.fetcher
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    /// Get the composite id (`<pk>_<owner>`) for a pk or composite id.
    ///
    /// A bare pk needs the owner, which costs a metadata fetch the first time.
    pub async fn media_id(&self, media_id: &str) -> Result<String> {
        if resolver::is_composite(media_id) {
            return Ok(media_id.to_string());
        }

        if media_id.is_empty() || !media_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::format(format!(
                "media id must contain only digits, got {:?}",
                media_id
            )));
        }

        let media_pk = resolver::media_pk(media_id)?;
        let user = self.user(media_id).await?;
        Ok(compose_id(media_pk, user.pk))
    }

    /// Get the pk from a pk or composite id
    pub fn media_pk(media_id: &str) -> Result<u64> {
        resolver::media_pk(media_id)
    }

    /// Get the pk from a short code
    pub fn media_pk_from_code(code: &str) -> Result<u64> {
        resolver::media_pk_from_code(code)
    }

    /// Get the pk from a media URL
    pub fn media_pk_from_url(url: &str) -> Result<u64> {
        resolver::media_pk_from_url(url)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Fetch media from the logged-out public page (bypasses the cache)
    pub async fn media_info_a1(&self, media_id: &str, max_id: Option<&str>) -> Result<Media> {
        self.fetcher
            .media_info_a1(Self::media_pk(media_id)?, max_id)
            .await
    }

    /// Fetch media through the public graph query (bypasses the cache)
    pub async fn media_info_gql(&self, media_id: &str) -> Result<Media> {
        self.fetcher.media_info_gql(Self::media_pk(media_id)?).await
    }

    /// Fetch media from the private API (bypasses the cache)
    pub async fn media_info_v1(&self, media_id: &str) -> Result<Media> {
        self.fetcher.media_info_v1(Self::media_pk(media_id)?).await
    }

    /// Get media metadata.
    ///
    /// With `use_cache` a cached entry is returned without network access;
    /// otherwise, or on a miss, the fallback chain runs and its result
    /// replaces the cache entry.
    #[instrument(skip(self))]
    pub async fn info(&self, media_id: &str, use_cache: bool) -> Result<Media> {
        let media_pk = Self::media_pk(media_id)?;

        if use_cache {
            if let Some(media) = self.cache.get(media_pk) {
                debug!(media_pk, "Cache hit");
                return Ok(media);
            }
        }

        debug!(media_pk, "Fetching media");
        let media = self.fetcher.fetch(media_pk).await?;
        self.cache.put(media_pk, media.clone());
        Ok(media)
    }

    /// Get the author of a media item
    pub async fn user(&self, media_id: &str) -> Result<UserShort> {
        Ok(self.info(media_id, true).await?.user)
    }

    /// Get oEmbed information for a media URL (never cached)
    pub async fn oembed(&self, url: &str) -> Result<EmbedInfo> {
        let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
        let data = self
            .transport
            .private_fetch(&format!("oembed?url={}", encoded), None)
            .await?;
        extract_media_oembed(&data)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Delete a media item; returns whether the platform confirmed it
    #[instrument(skip(self))]
    pub async fn delete(&self, media_id: &str) -> Result<bool> {
        self.session.require_login()?;
        let media_id = self.media_id(media_id).await?;
        let media_pk = Self::media_pk(&media_id)?;

        let mut data = Payload::new();
        data.insert("media_id".to_string(), json!(media_id));

        self.cache.evict(media_pk);
        let result = self
            .transport
            .private_fetch(
                &format!("media/{}/delete/", media_id),
                Some(&self.session.with_default_data(data)),
            )
            .await;
        // A read racing the request may have re-cached the old state
        self.cache.evict(media_pk);

        let deleted = result?
            .get("did_delete")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        info!(%media_id, deleted, "Delete requested");
        Ok(deleted)
    }

    /// Edit caption, title, user tags and location of a media item.
    ///
    /// Long-form videos take a title: when `title` is empty it is split off
    /// the first caption line, or is the first 75 characters of the caption
    /// when there is no line break. Tags and location only apply to other
    /// media. Returns the raw platform response.
    #[instrument(skip(self, caption, title, usertags, location))]
    pub async fn edit(
        &self,
        media_id: &str,
        caption: &str,
        title: &str,
        usertags: &[Usertag],
        location: Option<&Location>,
    ) -> Result<Value> {
        self.session.require_login()?;
        let media_id = self.media_id(media_id).await?;
        let media_pk = Self::media_pk(&media_id)?;
        let media = self.info(&media_id, true).await?;

        let data = if media.is_long_form() {
            let (title, caption) = split_title(caption, title);
            edit_payload_long_form(&caption, &title)
        } else {
            edit_payload(caption, usertags, location)
        };

        self.cache.evict(media_pk);
        self.transport
            .private_fetch(
                &format!("media/{}/edit_media/", media_id),
                Some(&self.session.with_default_data(data)),
            )
            .await
    }

    /// Like a media item, or unlike it when `revert` is set
    #[instrument(skip(self))]
    pub async fn like(&self, media_id: &str, revert: bool) -> Result<bool> {
        self.session.require_login()?;
        let media_id = self.media_id(media_id).await?;

        let data = like_payload(&media_id, rand::thread_rng().gen_range(0..=6));

        let action = if revert { "unlike" } else { "like" };
        let result = self
            .transport
            .private_fetch(
                &format!("media/{}/{}/", media_id, action),
                Some(&self.session.with_action_data(data)),
            )
            .await?;

        Ok(result.get("status").and_then(Value::as_str) == Some("ok"))
    }

    /// Remove a like
    pub async fn unlike(&self, media_id: &str) -> Result<bool> {
        self.like(media_id, true).await
    }
}

/// Resolve the (title, caption) pair for a long-form edit
pub fn split_title(caption: &str, title: &str) -> (String, String) {
    if !title.is_empty() {
        return (title.to_string(), caption.to_string());
    }

    match caption.split_once('\n') {
        Some((title, rest)) => (title.to_string(), rest.to_string()),
        None => (
            caption.chars().take(TITLE_MAX_CHARS).collect(),
            caption.to_string(),
        ),
    }
}

/// Engagement payload; `feed_position` is telemetry only
fn like_payload(media_id: &str, feed_position: u8) -> Payload {
    let mut data = Payload::new();
    data.insert("inventory_source".to_string(), json!("media_or_ad"));
    data.insert("media_id".to_string(), json!(media_id));
    data.insert("radio_type".to_string(), json!("wifi-none"));
    data.insert("is_carousel_bumped_post".to_string(), json!("false"));
    data.insert("container_module".to_string(), json!("feed_timeline"));
    data.insert("feed_position".to_string(), json!(feed_position.to_string()));
    data
}

fn edit_payload_long_form(caption: &str, title: &str) -> Payload {
    let mut data = Payload::new();
    data.insert("caption_text".to_string(), json!(caption));
    data.insert("title".to_string(), json!(title));
    data.insert("igtv_ads_toggled_on".to_string(), json!("0"));
    data
}

fn edit_payload(caption: &str, usertags: &[Usertag], location: Option<&Location>) -> Payload {
    let tags: Vec<Value> = usertags
        .iter()
        .map(|tag| json!({"user_id": tag.user.pk, "position": [tag.x, tag.y]}))
        .collect();

    let mut data = Payload::new();
    data.insert("caption_text".to_string(), json!(caption));
    data.insert("container_module".to_string(), json!("edit_media_info"));
    data.insert("feed_position".to_string(), json!("0"));
    data.insert("location".to_string(), json!(Location::edit_payload(location)));
    data.insert("usertags".to_string(), json!(json!({ "in": tags }).to_string()));
    data.insert("is_carousel_bumped_post".to_string(), json!("false"));
    data
}
