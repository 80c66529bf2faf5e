use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, OptionExt, Result, eyre};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::google_rs::auth::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL};
use crate::services::accounts::GoogleOAuthConfig;
use crate::youtube_rs::client::YOUTUBE_ENDPOINT;

const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8085";

const PREFERENCES_FILE: &str = "preferences.toml";
const CREDENTIALS_FILE: &str = "credentials.toml";
const PENDING_ADD_FILE: &str = "pending-add.json";

const DEFAULT_CONFIG: &str = r#"# Key for anonymous lookups (`watch-later info`)
api_key = ""

# OAuth client of type "Desktop app" from the Google Cloud console
client_id = ""
client_secret = ""

# redirect_uri = "http://127.0.0.1:8085"
# data_directory = "~/.local/share/watch-later"
# require_account_permission = false

# [endpoints]
# youtube = "https://www.googleapis.com/youtube/v3/"
# oauth_token = "https://oauth2.googleapis.com/token"
# oauth_authorize = "https://accounts.google.com/o/oauth2/v2/auth"
"#;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    api_key: Option<String>,
    client_id: String,
    client_secret: String,
    #[serde(default = "default_redirect_uri")]
    redirect_uri: String,
    #[serde(default)]
    data_directory: Option<String>,
    #[serde(default)]
    pub require_account_permission: bool,
    #[serde(default)]
    endpoints: Endpoints,
}

/// Alternate hosts, only useful against a local mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub youtube: String,
    pub oauth_token: String,
    pub oauth_authorize: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            youtube: YOUTUBE_ENDPOINT.to_string(),
            oauth_token: GOOGLE_TOKEN_URL.to_string(),
            oauth_authorize: GOOGLE_AUTH_URL.to_string(),
        }
    }
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("watch-later").join("config.toml"))
    }

    /// Load config from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or_eyre("No config directory on this platform")?;

        Self::from_file(&config_path)
    }

    /// Write the config template to the default path, unless a config exists
    pub fn create_default() -> Result<PathBuf> {
        let config_path = Self::config_path().ok_or_eyre("No config directory on this platform")?;
        Self::create_default_at(&config_path)?;
        Ok(config_path)
    }

    fn create_default_at(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(eyre!("Config file already exists: {}", path.display()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, DEFAULT_CONFIG)
            .wrap_err(format!("Failed to write config file: {}", path.display()))
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get expanded data directory path
    pub fn data_directory_path(&self) -> Result<PathBuf> {
        match &self.data_directory {
            Some(directory) => Ok(self.expand_path(directory)),
            None => dirs::data_dir()
                .map(|path| path.join("watch-later"))
                .ok_or_eyre("No data directory on this platform, set data_directory"),
        }
    }

    pub fn preferences_path(&self) -> Result<PathBuf> {
        Ok(self.data_directory_path()?.join(PREFERENCES_FILE))
    }

    pub fn credentials_path(&self) -> Result<PathBuf> {
        Ok(self.data_directory_path()?.join(CREDENTIALS_FILE))
    }

    pub fn pending_add_path(&self) -> Result<PathBuf> {
        Ok(self.data_directory_path()?.join(PENDING_ADD_FILE))
    }

    /// An empty key counts as not configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn youtube_endpoint(&self) -> Result<Url> {
        let mut endpoint = self.endpoints.youtube.clone();
        // relative joins drop the last segment otherwise
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        Url::parse(&endpoint).wrap_err(format!("Invalid youtube endpoint: {}", endpoint))
    }

    pub fn oauth(&self) -> Result<GoogleOAuthConfig> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(eyre!("client_id and client_secret must be set in the config"));
        }

        Ok(GoogleOAuthConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            token_url: Url::parse(&self.endpoints.oauth_token).wrap_err(format!(
                "Invalid oauth_token endpoint: {}",
                self.endpoints.oauth_token
            ))?,
            authorize_url: Url::parse(&self.endpoints.oauth_authorize).wrap_err(format!(
                "Invalid oauth_authorize endpoint: {}",
                self.endpoints.oauth_authorize
            ))?,
        })
    }
}
