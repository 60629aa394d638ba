//! Media identifier encodings.
//!
//! - codec: primary key <-> short code
//! - resolver: primary key / composite id / short code / URL normalization

pub mod codec;
pub mod resolver;

pub use resolver::{compose_id, media_pk, media_pk_from_code, media_pk_from_url, MediaRef};
