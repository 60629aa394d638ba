//! Normalized media metadata.
//!
//! All three fetch strategies produce the same [`Media`] shape, whatever the
//! upstream payload looked like.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Location, UserShort};

/// A media item with its descriptive fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Primary key
    pub pk: u64,

    /// Composite ID (`<pk>_<owner pk>`)
    pub id: String,

    /// Short code used in public URLs
    pub code: String,

    /// When the media was published
    pub taken_at: Option<DateTime<Utc>>,

    pub media_type: MediaType,

    pub product_type: ProductType,

    /// Author
    pub user: UserShort,

    #[serde(default)]
    pub caption_text: String,

    /// Title (long-form video only)
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub like_count: u64,

    #[serde(default)]
    pub comment_count: u64,

    #[serde(default)]
    pub view_count: u64,

    #[serde(default)]
    pub location: Option<Location>,

    #[serde(default)]
    pub usertags: Vec<Usertag>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub video_url: Option<String>,
}

impl Media {
    /// Whether edits need the long-form (title + caption) payload
    pub fn is_long_form(&self) -> bool {
        self.product_type == ProductType::Igtv
    }
}

/// Kind of media payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Photo,
    Video,
    /// Carousel of photos/videos
    Album,
}

impl MediaType {
    /// Map the numeric `media_type` of private API payloads
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(MediaType::Photo),
            2 => Some(MediaType::Video),
            8 => Some(MediaType::Album),
            _ => None,
        }
    }

    /// Map the `__typename` of graph payloads
    pub fn from_typename(typename: &str) -> Option<Self> {
        match typename {
            "GraphImage" => Some(MediaType::Photo),
            "GraphVideo" => Some(MediaType::Video),
            "GraphSidecar" => Some(MediaType::Album),
            _ => None,
        }
    }
}

/// Product surface the media belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Feed,
    /// Long-form video
    Igtv,
    /// Short-form video
    Clips,
    /// Carousel container
    CarouselContainer,
    Other,
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductType::Feed => write!(f, "feed"),
            ProductType::Igtv => write!(f, "igtv"),
            ProductType::Clips => write!(f, "clips"),
            ProductType::CarouselContainer => write!(f, "carousel_container"),
            ProductType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for ProductType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "feed" => ProductType::Feed,
            "igtv" => ProductType::Igtv,
            "clips" => ProductType::Clips,
            "carousel_container" => ProductType::CarouselContainer,
            _ => ProductType::Other,
        })
    }
}

/// A user tagged on a media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usertag {
    pub user: UserShort,

    /// Horizontal position, 0.0..=1.0
    pub x: f64,

    /// Vertical position, 0.0..=1.0
    pub y: f64,
}

impl Usertag {
    pub fn new(user: UserShort, x: f64, y: f64) -> Self {
        Self { user, x, y }
    }
}
