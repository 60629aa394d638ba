//! Domain types for media metadata.
//!
//! - Media: normalized metadata, whatever strategy produced it
//! - UserShort: author and tagged users
//! - Location: places, partial or completed
//! - EmbedInfo: oEmbed responses

pub mod embed;
pub mod location;
pub mod media;
pub mod user;

pub use embed::EmbedInfo;
pub use location::Location;
pub use media::{Media, MediaType, ProductType, Usertag};
pub use user::UserShort;
