//! Extraction of domain types from raw platform JSON.
//!
//! Each fetch strategy returns a differently shaped payload:
//! - private API (`v1`): flat media item with numeric `media_type`
//! - public graph (`gql`): `shortcode_media` with `edge_*` connections
//! - oEmbed: flat embed description
//!
//! IDs arrive as numbers in some payloads and strings in others, so every
//! numeric field is read leniently.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::{EmbedInfo, Location, Media, MediaType, ProductType, UserShort, Usertag};
use crate::error::{Error, Result};
use crate::identifiers::compose_id;

/// Read an unsigned integer stored as a JSON number or a numeric string
fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn u64_field(data: &Value, key: &str) -> Option<u64> {
    data.get(key).and_then(lenient_u64)
}

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn f64_field(data: &Value, key: &str) -> Option<f64> {
    data.get(key).and_then(Value::as_f64)
}

fn timestamp(secs: Option<u64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| i64::try_from(s).ok())
        .and_then(|s| Utc.timestamp_opt(s, 0).single())
}

/// First `pk`/`id` found, in that order
fn pk_field(data: &Value) -> Option<u64> {
    u64_field(data, "pk").or_else(|| u64_field(data, "id"))
}

/// Extract a user reference (`pk` or `id`, plus `username`)
pub fn extract_user_short(data: &Value) -> Result<UserShort> {
    let pk = pk_field(data).ok_or_else(|| Error::extract("user without pk"))?;

    Ok(UserShort {
        pk,
        username: str_field(data, "username").unwrap_or_default(),
        full_name: str_field(data, "full_name").unwrap_or_default(),
        profile_pic_url: str_field(data, "profile_pic_url"),
    })
}

/// Extract a location from any payload shape, including a serialized [`Location`]
pub fn extract_location(data: &Value) -> Result<Location> {
    if !data.is_object() {
        return Err(Error::extract("location is not an object"));
    }

    let external_id = u64_field(data, "external_id").or_else(|| u64_field(data, "facebook_places_id"));
    let external_id_source = str_field(data, "external_id_source").or_else(|| {
        data.get("facebook_places_id")
            .filter(|v| !v.is_null())
            .map(|_| "facebook_places".to_string())
    });

    Ok(Location {
        pk: pk_field(data),
        name: str_field(data, "name").unwrap_or_default(),
        address: str_field(data, "address"),
        city: str_field(data, "city"),
        lat: f64_field(data, "lat"),
        lng: f64_field(data, "lng"),
        external_id,
        external_id_source,
    })
}

/// Extract media from a private API item
pub fn extract_media_v1(data: &Value) -> Result<Media> {
    let pk = u64_field(data, "pk").ok_or_else(|| Error::extract("media item without pk"))?;
    let user = data
        .get("user")
        .ok_or_else(|| Error::extract("media item without user"))
        .and_then(extract_user_short)?;

    let media_type = u64_field(data, "media_type")
        .and_then(MediaType::from_code)
        .ok_or_else(|| Error::extract(format!("media {} has unknown media_type", pk)))?;

    let usertags = data
        .pointer("/usertags/in")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().map(extract_usertag_v1).collect::<Result<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    let location = match data.get("location") {
        Some(loc) if !loc.is_null() => Some(extract_location(loc)?),
        _ => None,
    };

    Ok(Media {
        pk,
        id: str_field(data, "id").unwrap_or_else(|| compose_id(pk, user.pk)),
        code: str_field(data, "code").unwrap_or_default(),
        taken_at: timestamp(u64_field(data, "taken_at")),
        media_type,
        product_type: product_type(data),
        caption_text: data
            .pointer("/caption/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        title: str_field(data, "title"),
        like_count: u64_field(data, "like_count").unwrap_or(0),
        comment_count: u64_field(data, "comment_count").unwrap_or(0),
        view_count: u64_field(data, "view_count")
            .or_else(|| u64_field(data, "play_count"))
            .unwrap_or(0),
        location,
        usertags,
        thumbnail_url: data
            .pointer("/image_versions2/candidates/0/url")
            .and_then(Value::as_str)
            .map(str::to_string),
        video_url: data
            .pointer("/video_versions/0/url")
            .and_then(Value::as_str)
            .map(str::to_string),
        user,
    })
}

fn extract_usertag_v1(tag: &Value) -> Result<Usertag> {
    let user = tag
        .get("user")
        .ok_or_else(|| Error::extract("usertag without user"))
        .and_then(extract_user_short)?;
    let x = tag.pointer("/position/0").and_then(Value::as_f64).unwrap_or(0.0);
    let y = tag.pointer("/position/1").and_then(Value::as_f64).unwrap_or(0.0);
    Ok(Usertag::new(user, x, y))
}

/// Extract media from a graph `shortcode_media` object
pub fn extract_media_gql(data: &Value) -> Result<Media> {
    let pk = u64_field(data, "id").ok_or_else(|| Error::extract("shortcode_media without id"))?;
    let user = data
        .get("owner")
        .ok_or_else(|| Error::extract("shortcode_media without owner"))
        .and_then(extract_user_short)?;

    let media_type = data
        .get("__typename")
        .and_then(Value::as_str)
        .and_then(MediaType::from_typename)
        .ok_or_else(|| Error::extract(format!("media {} has unknown __typename", pk)))?;

    let usertags = data
        .pointer("/edge_media_to_tagged_user/edges")
        .and_then(Value::as_array)
        .map(|edges| {
            edges
                .iter()
                .map(|edge| extract_usertag_gql(edge.get("node").unwrap_or(&Value::Null)))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let location = match data.get("location") {
        Some(loc) if !loc.is_null() => Some(extract_location(loc)?),
        _ => None,
    };

    let comment_count = data
        .pointer("/edge_media_to_parent_comment/count")
        .or_else(|| data.pointer("/edge_media_to_comment/count"))
        .and_then(lenient_u64)
        .unwrap_or(0);

    let like_count = data
        .pointer("/edge_media_preview_like/count")
        .or_else(|| data.pointer("/edge_liked_by/count"))
        .and_then(lenient_u64)
        .unwrap_or(0);

    Ok(Media {
        pk,
        id: compose_id(pk, user.pk),
        code: str_field(data, "shortcode").unwrap_or_default(),
        taken_at: timestamp(u64_field(data, "taken_at_timestamp")),
        media_type,
        product_type: product_type(data),
        caption_text: data
            .pointer("/edge_media_to_caption/edges/0/node/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        title: str_field(data, "title"),
        like_count,
        comment_count,
        view_count: u64_field(data, "video_view_count").unwrap_or(0),
        location,
        usertags,
        thumbnail_url: str_field(data, "display_url"),
        video_url: str_field(data, "video_url"),
        user,
    })
}

fn extract_usertag_gql(node: &Value) -> Result<Usertag> {
    let user = node
        .get("user")
        .ok_or_else(|| Error::extract("tagged user node without user"))
        .and_then(extract_user_short)?;
    Ok(Usertag::new(
        user,
        f64_field(node, "x").unwrap_or(0.0),
        f64_field(node, "y").unwrap_or(0.0),
    ))
}

fn product_type(data: &Value) -> ProductType {
    data.get("product_type")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// Extract an oEmbed response
pub fn extract_media_oembed(data: &Value) -> Result<EmbedInfo> {
    let media_id = str_field(data, "media_id").ok_or_else(|| Error::extract("oembed without media_id"))?;

    let author_id = u64_field(data, "author_id").or_else(|| {
        media_id
            .split_once('_')
            .and_then(|(_, owner)| owner.parse().ok())
    });

    Ok(EmbedInfo {
        author_name: str_field(data, "author_name").unwrap_or_default(),
        author_url: str_field(data, "author_url"),
        author_id,
        title: str_field(data, "title").unwrap_or_default(),
        provider_name: str_field(data, "provider_name").unwrap_or_default(),
        html: str_field(data, "html").unwrap_or_default(),
        thumbnail_url: str_field(data, "thumbnail_url"),
        thumbnail_width: u64_field(data, "thumbnail_width").and_then(|w| u32::try_from(w).ok()),
        thumbnail_height: u64_field(data, "thumbnail_height").and_then(|h| u32::try_from(h).ok()),
        can_view: data.get("can_view").and_then(Value::as_bool).unwrap_or(true),
        media_id,
    })
}
