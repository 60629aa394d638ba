//! Normalization of media identifiers.
//!
//! Accepted forms:
//! - primary key: `2110901750722920960`
//! - composite id: `2110901750722920960_1903424587`
//! - short code: `B1LbfVPlwIA`
//! - URL: `https://www.instagram.com/p/B1LbfVPlwIA/?igshid=...`
//!
//! Everything here is offline. Building a composite id from a bare primary
//! key needs the owner, which only a metadata fetch can supply; that step
//! lives in `MediaClient::media_id`.

use std::str::FromStr;

use url::Url;

use super::codec;
use crate::error::{Error, Result};

/// Separator between primary key and owner in a composite id
pub const ID_SEPARATOR: char = '_';

/// Extract the primary key from a primary key or composite id
pub fn media_pk(media_id: &str) -> Result<u64> {
    let pk = match media_id.split_once(ID_SEPARATOR) {
        Some((pk, _owner)) => pk,
        None => media_id,
    };

    pk.parse::<u64>()
        .map_err(|_| Error::format(format!("{:?} is not a media pk or id", media_id)))
}

/// Decode a short code (first 11 characters only)
pub fn media_pk_from_code(code: &str) -> Result<u64> {
    codec::decode(code)
}

/// Extract the primary key from a media URL.
///
/// The short code is the last non-empty path segment, so query strings and
/// trailing slashes make no difference.
pub fn media_pk_from_url(url: &str) -> Result<u64> {
    let parsed = Url::parse(url).map_err(|e| Error::format(format!("invalid URL {:?}: {}", url, e)))?;

    let code = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| Error::format(format!("URL {:?} has no path segments", url)))?;

    media_pk_from_code(code)
}

/// Join a primary key and owner into a composite id
pub fn compose_id(media_pk: u64, owner_pk: u64) -> String {
    format!("{}{}{}", media_pk, ID_SEPARATOR, owner_pk)
}

/// Whether the input is already a composite id
pub fn is_composite(media_id: &str) -> bool {
    media_id.contains(ID_SEPARATOR)
}

/// Any accepted identifier form, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Pk(u64),
    Id(String),
    Code(String),
    Url(String),
}

impl MediaRef {
    /// Resolve to a primary key without touching the network
    pub fn media_pk(&self) -> Result<u64> {
        match self {
            MediaRef::Pk(pk) => Ok(*pk),
            MediaRef::Id(id) => media_pk(id),
            MediaRef::Code(code) => media_pk_from_code(code),
            MediaRef::Url(url) => media_pk_from_url(url),
        }
    }

    /// The pk or composite id form `MediaClient` methods take.
    ///
    /// Composite ids pass through; every other form becomes its pk.
    pub fn to_media_id(&self) -> Result<String> {
        match self {
            MediaRef::Id(id) => Ok(id.clone()),
            other => Ok(other.media_pk()?.to_string()),
        }
    }
}

impl FromStr for MediaRef {
    type Err = Error;

    /// Classify an identifier.
    ///
    /// All-digit input is a primary key. Short codes may contain `_`, so a
    /// composite id must be digits on both sides of the separator.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::format("empty media identifier"));
        }

        if s.contains("://") {
            return Ok(MediaRef::Url(s.to_string()));
        }
        if s.starts_with("instagram.com/") || s.starts_with("www.instagram.com/") {
            return Ok(MediaRef::Url(format!("https://{}", s)));
        }

        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());

        if all_digits(s) {
            let pk = s
                .parse::<u64>()
                .map_err(|_| Error::format(format!("media pk {:?} is out of range", s)))?;
            return Ok(MediaRef::Pk(pk));
        }

        if let Some((pk, owner)) = s.split_once(ID_SEPARATOR) {
            if all_digits(pk) && all_digits(owner) {
                return Ok(MediaRef::Id(s.to_string()));
            }
        }

        codec::decode(s)?;
        Ok(MediaRef::Code(s.to_string()))
    }
}
