//! oEmbed response for a public media URL.

use serde::{Deserialize, Serialize};

/// Embed metadata for a media URL
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmbedInfo {
    /// Composite media ID (`<pk>_<owner>`)
    pub media_id: String,

    pub author_name: String,

    pub author_url: Option<String>,

    /// Owner user ID, taken from the media ID suffix
    pub author_id: Option<u64>,

    pub title: String,

    pub provider_name: String,

    pub html: String,

    pub thumbnail_url: Option<String>,

    pub thumbnail_width: Option<u32>,

    pub thumbnail_height: Option<u32>,

    pub can_view: bool,
}
