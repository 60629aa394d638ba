//! Command-line interface for media-resolver.
//!
//! Provides commands for converting between identifier forms, inspecting
//! media metadata and performing the basic media mutations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config;
use crate::core::MediaClient;
use crate::domain::Media;
use crate::identifiers::{codec, MediaRef};

/// media-resolver - media identifier resolver and metadata client
#[derive(Parser, Debug)]
#[command(name = "media-resolver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the primary key of a media reference (pk, id, code or URL)
    Pk {
        media: String,
    },

    /// Print the short code of a media reference
    Code {
        media: String,
    },

    /// Print the composite id (<pk>_<owner>) of a media reference
    Id {
        media: String,
    },

    /// Show media metadata
    Info {
        media: String,

        /// Skip the cache and refetch
        #[arg(long)]
        no_cache: bool,

        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the author of a media item
    User {
        media: String,
    },

    /// Show oEmbed information for a media URL
    Oembed {
        url: String,
    },

    /// Delete a media item
    Delete {
        media: String,
    },

    /// Edit the caption (and title, for long-form video)
    Edit {
        media: String,

        #[arg(short, long)]
        caption: String,

        /// Title; taken from the first caption line when empty
        #[arg(short, long, default_value = "")]
        title: String,
    },

    /// Like a media item
    Like {
        media: String,
    },

    /// Remove a like
    Unlike {
        media: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Pk { media } => {
                println!("{}", parse_ref(&media)?.media_pk()?);
                Ok(())
            }
            Commands::Code { media } => {
                println!("{}", codec::encode(parse_ref(&media)?.media_pk()?));
                Ok(())
            }
            Commands::Id { media } => {
                let client = client()?;
                println!("{}", client.media_id(&to_media_id(&media)?).await?);
                Ok(())
            }
            Commands::Info {
                media,
                no_cache,
                json,
            } => show_info(&media, !no_cache, json).await,
            Commands::User { media } => {
                let user = client()?.user(&to_media_id(&media)?).await?;
                println!("{} (pk {})", user.username, user.pk);
                if !user.full_name.is_empty() {
                    println!("  {}", user.full_name);
                }
                Ok(())
            }
            Commands::Oembed { url } => {
                let embed = client()?.oembed(&url).await?;
                println!("{}", serde_json::to_string_pretty(&embed)?);
                Ok(())
            }
            Commands::Delete { media } => {
                let deleted = client()?.delete(&to_media_id(&media)?).await?;
                if !deleted {
                    anyhow::bail!("Platform did not confirm deletion of {}", media);
                }
                eprintln!("Deleted {}", media);
                Ok(())
            }
            Commands::Edit {
                media,
                caption,
                title,
            } => {
                let result = client()?
                    .edit(&to_media_id(&media)?, &caption, &title, &[], None)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            }
            Commands::Like { media } => like(&media, false).await,
            Commands::Unlike { media } => like(&media, true).await,
            Commands::Config => show_config(),
        }
    }
}

fn client() -> Result<MediaClient> {
    let cfg = config::config()?;
    MediaClient::from_config(cfg).context("Failed to create media client")
}

fn parse_ref(media: &str) -> Result<MediaRef> {
    media
        .parse::<MediaRef>()
        .with_context(|| format!("Invalid media reference: {}", media))
}

fn to_media_id(media: &str) -> Result<String> {
    Ok(parse_ref(media)?.to_media_id()?)
}

/// Show media metadata
async fn show_info(media: &str, use_cache: bool, json: bool) -> Result<()> {
    let media = client()?.info(&to_media_id(media)?, use_cache).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&media)?);
    } else {
        print_media(&media);
    }
    Ok(())
}

fn print_media(media: &Media) {
    println!("Media: {} ({})", media.pk, media.code);
    println!("ID: {}", media.id);
    println!("Type: {:?} / {}", media.media_type, media.product_type);
    println!("Author: {} (pk {})", media.user.username, media.user.pk);
    if let Some(taken_at) = media.taken_at {
        println!("Taken at: {}", taken_at);
    }
    if let Some(title) = &media.title {
        println!("Title: {}", title);
    }
    println!("Likes: {}  Comments: {}", media.like_count, media.comment_count);
    if let Some(location) = &media.location {
        println!("Location: {}", location.name);
    }
    if !media.usertags.is_empty() {
        let tagged: Vec<&str> = media.usertags.iter().map(|t| t.user.username.as_str()).collect();
        println!("Tagged: {}", tagged.join(", "));
    }
    if !media.caption_text.is_empty() {
        println!();
        println!("{}", media.caption_text);
    }
}

async fn like(media: &str, revert: bool) -> Result<()> {
    let ok = client()?.like(&to_media_id(media)?, revert).await?;
    let action = if revert { "unlike" } else { "like" };
    if !ok {
        anyhow::bail!("Platform rejected {} of {}", action, media);
    }
    eprintln!("{}d {}", action, media);
    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!("Home: {}", cfg.home.display());
    println!();
    println!("Session:");
    println!(
        "  Session ID: {}",
        if cfg.session.sessionid.is_some() { "(set)" } else { "(none)" }
    );
    println!(
        "  User ID:    {}",
        cfg.session
            .user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("  Device ID:  {}", cfg.session.device_id);
    println!();
    println!("API:");
    println!("  Private: {}", cfg.api.private_base_url);
    println!("  Public:  {}", cfg.api.public_base_url);
    println!("  Timeout: {}s", cfg.api.timeout_seconds);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["media-resolver", "info", "B1LbfVPlwIA", "--no-cache"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Info { ref media, no_cache: true, json: false } if media == "B1LbfVPlwIA"
        ));

        let cli = Cli::try_parse_from(["media-resolver", "edit", "1_2", "-c", "Hi"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Edit { ref caption, ref title, .. } if caption == "Hi" && title.is_empty()
        ));
    }

    #[test]
    fn test_to_media_id() {
        assert_eq!(to_media_id("1_2").unwrap(), "1_2");
        assert_eq!(to_media_id("B1LbfVPlwIA").unwrap(), "2110901750722920960");
        assert_eq!(
            to_media_id("https://www.instagram.com/p/B1LbfVPlwIA/").unwrap(),
            "2110901750722920960"
        );
        assert!(to_media_id("???").is_err());
    }
}
