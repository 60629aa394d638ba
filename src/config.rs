//! Configuration for the media client.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MEDIA_RESOLVER_SESSIONID, MEDIA_RESOLVER_USER_ID,
//!    MEDIA_RESOLVER_HOME)
//! 2. Config file (.media-resolver/config.yaml)
//! 3. Defaults (~/.media-resolver)
//!
//! Config file discovery:
//! - Searches current directory and parents for .media-resolver/config.yaml
//! - Falls back to $MEDIA_RESOLVER_HOME/config.yaml

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".media-resolver";
const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Session cookie of an already logged-in account
    pub sessionid: Option<String>,
    /// User ID the session belongs to
    pub user_id: Option<u64>,
    /// Client UUID sent with mutations
    pub uuid: Option<Uuid>,
    /// Device ID sent with mutations
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub private_base_url: Option<String>,
    pub public_base_url: Option<String>,
    pub user_agent: Option<String>,
    pub app_id: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Endpoint and HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiSettings {
    pub private_base_url: String,
    pub public_base_url: String,
    pub user_agent: String,
    pub app_id: String,
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            private_base_url: "https://i.instagram.com/api/v1".to_string(),
            public_base_url: "https://www.instagram.com".to_string(),
            user_agent: "Instagram 194.0.0.36.172 Android (26/8.0.0; 480dpi; 1080x1920; \
                         Xiaomi; MI 5s; capricorn; qcom; en_US; 301484483)"
                .to_string(),
            app_id: "936619743392459".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Acting session, after defaults are applied
#[derive(Debug, Clone, Serialize)]
pub struct SessionSettings {
    #[serde(skip_serializing)]
    pub sessionid: Option<String>,
    pub user_id: Option<u64>,
    pub uuid: Uuid,
    pub device_id: String,
}

impl SessionSettings {
    fn resolve(config: SessionConfig) -> Self {
        let uuid = config.uuid.unwrap_or_else(Uuid::new_v4);
        let device_id = config
            .device_id
            .unwrap_or_else(|| format!("android-{}", &uuid.simple().to_string()[..16]));

        // A bare session cookie starts with the user ID ("<user_id>%3A...")
        let user_id = config.user_id.or_else(|| {
            config
                .sessionid
                .as_deref()
                .and_then(|s| s.split("%3A").next())
                .and_then(|s| s.parse().ok())
        });

        Self {
            sessionid: config.sessionid,
            user_id,
            uuid,
            device_id,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the home directory
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub session: SessionSettings,
    pub api: ApiSettings,
}

impl ApiSettings {
    fn resolve(config: Option<ApiConfig>) -> Self {
        let defaults = Self::default();
        let Some(config) = config else {
            return defaults;
        };

        Self {
            private_base_url: config.private_base_url.unwrap_or(defaults.private_base_url),
            public_base_url: config.public_base_url.unwrap_or(defaults.public_base_url),
            user_agent: config.user_agent.unwrap_or(defaults.user_agent),
            app_id: config.app_id.unwrap_or(defaults.app_id),
            timeout_seconds: config.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file(home: &Path) -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    let home_config = home.join(CONFIG_FILE);
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Apply environment overrides on top of file settings
fn apply_env(mut session: SessionConfig) -> Result<SessionConfig> {
    if let Ok(sessionid) = std::env::var("MEDIA_RESOLVER_SESSIONID") {
        session.sessionid = Some(sessionid);
    }
    if let Ok(user_id) = std::env::var("MEDIA_RESOLVER_USER_ID") {
        let user_id = user_id
            .parse()
            .with_context(|| format!("MEDIA_RESOLVER_USER_ID is not a number: {}", user_id))?;
        session.user_id = Some(user_id);
    }
    Ok(session)
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let home = match std::env::var("MEDIA_RESOLVER_HOME") {
        Ok(home) => PathBuf::from(home),
        Err(_) => dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(CONFIG_DIR),
    };

    let config_file = find_config_file(&home);

    let (session, api) = match config_file {
        Some(ref config_path) => {
            let config = load_config_file(config_path)?;
            (config.session, config.api)
        }
        None => (SessionConfig::default(), None),
    };

    Ok(ResolvedConfig {
        home,
        config_file,
        session: SessionSettings::resolve(apply_env(session)?),
        api: ApiSettings::resolve(api),
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
