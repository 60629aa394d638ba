//! Media author reference.

use serde::{Deserialize, Serialize};

/// Minimal user record embedded in media and tag payloads
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserShort {
    /// Platform user ID
    pub pk: u64,

    pub username: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

impl UserShort {
    pub fn new(pk: u64, username: impl Into<String>) -> Self {
        Self {
            pk,
            username: username.into(),
            ..Default::default()
        }
    }
}
