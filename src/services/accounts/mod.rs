pub mod default_account;
pub mod login;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use color_eyre::eyre::{Result, WrapErr, eyre};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::google_rs::auth::{RefreshTokenError, SCOPE_YOUTUBE, initiate_oauth, refresh_access_token};
use crate::google_rs::types::OAuthSession;
use crate::ports::accounts::{
    ACCOUNT_TYPE_GOOGLE, Account, AccountStore, ConsentIntent, Token, TokenError,
};

/// Access tokens this close to expiry are refreshed instead of handed out
const EXPIRY_MARGIN_SECONDS: i64 = 60;

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: Url,
    pub authorize_url: Url,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Credentials {
    #[serde(default)]
    accounts: Vec<StoredAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAccount {
    name: String,
    refresh_token: String,
}

struct CachedToken {
    token: Token,
    expires_at: DateTime<Utc>,
}

/// Google accounts the user logged in with, backed by `credentials.toml`.
///
/// Access tokens are minted from the stored refresh tokens and kept in memory
/// until they expire or get invalidated.
pub struct GoogleAccountStore {
    client: Client,
    oauth: GoogleOAuthConfig,
    path: PathBuf,
    credentials: Mutex<Credentials>,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl GoogleAccountStore {
    pub fn open(path: &Path, oauth: GoogleOAuthConfig) -> Result<Self> {
        let credentials = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .wrap_err(format!("Failed to read credentials: {}", path.display()))?;
            toml::from_str(&contents)
                .wrap_err(format!("Failed to parse credentials: {}", path.display()))?
        } else {
            Credentials::default()
        };

        Ok(Self {
            client: Client::new(),
            oauth,
            path: path.to_path_buf(),
            credentials: Mutex::new(credentials),
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn oauth(&self) -> &GoogleOAuthConfig {
        &self.oauth
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Start a consent flow for `account_name`.
    pub fn begin_consent(&self, account_name: &str) -> (ConsentIntent, OAuthSession) {
        let (response, session) = initiate_oauth(
            &self.oauth.authorize_url,
            &self.oauth.client_id,
            &self.oauth.redirect_uri,
            Some(account_name),
        );
        let intent = ConsentIntent {
            account: account_name.to_string(),
            url: response.auth_url,
        };
        (intent, session)
    }

    /// Store (or replace) the refresh token of an account.
    pub fn add_account(&self, name: &str, refresh_token: &str) -> Result<()> {
        let mut credentials = self
            .credentials
            .lock()
            .map_err(|_| eyre!("Credentials lock poisoned"))?;

        match credentials.accounts.iter_mut().find(|stored| stored.name == name) {
            Some(stored) => stored.refresh_token = refresh_token.to_string(),
            None => credentials.accounts.push(StoredAccount {
                name: name.to_string(),
                refresh_token: refresh_token.to_string(),
            }),
        }
        self.save(&credentials)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.remove(name);
        }
        tracing::info!("Stored credentials for {}", name);
        Ok(())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string(credentials).wrap_err("Failed to serialize credentials")?;
        std::fs::write(&self.path, contents)
            .wrap_err(format!("Failed to write credentials: {}", self.path.display()))
    }

    fn refresh_token_for(&self, name: &str) -> Result<Option<String>, TokenError> {
        let credentials = self
            .credentials
            .lock()
            .map_err(|_| TokenError::Other("Credentials lock poisoned".to_string()))?;
        Ok(credentials
            .accounts
            .iter()
            .find(|stored| stored.name == name)
            .map(|stored| stored.refresh_token.clone()))
    }

    fn cached_token(&self, name: &str) -> Option<Token> {
        let cache = self.cache.lock().ok()?;
        let cached = cache.get(name)?;
        let usable_until = cached
            .expires_at
            .checked_sub_signed(Duration::seconds(EXPIRY_MARGIN_SECONDS))?;
        (Utc::now() < usable_until).then(|| cached.token.clone())
    }

    fn consent_required(&self, account_name: &str) -> TokenError {
        let (intent, _) = self.begin_consent(account_name);
        TokenError::ConsentRequired(intent)
    }
}

fn expiry_after(expires_in: u64) -> Option<DateTime<Utc>> {
    let ttl = Duration::try_seconds(i64::try_from(expires_in).ok()?)?;
    Utc::now().checked_add_signed(ttl)
}

#[async_trait::async_trait]
impl AccountStore for GoogleAccountStore {
    fn list_accounts(&self, account_type: &str) -> Vec<Account> {
        if account_type != ACCOUNT_TYPE_GOOGLE {
            return vec![];
        }
        match self.credentials.lock() {
            Ok(credentials) => credentials
                .accounts
                .iter()
                .map(|stored| Account::google(stored.name.clone()))
                .collect(),
            Err(_) => {
                tracing::error!("Credentials lock poisoned");
                vec![]
            }
        }
    }

    async fn get_token(&self, account: &Account, scope: &str) -> Result<Token, TokenError> {
        if scope != SCOPE_YOUTUBE {
            return Err(TokenError::Other(format!("Unsupported scope: {}", scope)));
        }
        if let Some(token) = self.cached_token(&account.name) {
            return Ok(token);
        }

        let Some(refresh_token) = self.refresh_token_for(&account.name)? else {
            tracing::debug!("No refresh token stored for {}", account.name);
            return Err(self.consent_required(&account.name));
        };

        let response = refresh_access_token(
            &self.client,
            &self.oauth.token_url,
            &self.oauth.client_id,
            &self.oauth.client_secret,
            &refresh_token,
        )
        .await
        .map_err(|error| match error {
            RefreshTokenError::ConsentRequired { reason } => {
                tracing::info!("Refresh token of {} is no longer valid: {}", account.name, reason);
                self.consent_required(&account.name)
            }
            RefreshTokenError::AccessDenied => TokenError::Cancelled,
            RefreshTokenError::FailedToSendRequest(error) => TokenError::Io(error.to_string()),
            error => TokenError::Other(error.to_string()),
        })?;

        let token = Token::new(response.access_token);
        let Some(expires_at) = expiry_after(response.expires_in) else {
            tracing::debug!(
                "Not caching token of {}, expires_in {} is out of range",
                account.name,
                response.expires_in
            );
            return Ok(token);
        };
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                account.name.clone(),
                CachedToken {
                    token: token.clone(),
                    expires_at,
                },
            );
        }
        Ok(token)
    }

    async fn invalidate_token(&self, account_type: &str, token: &Token) {
        if account_type != ACCOUNT_TYPE_GOOGLE {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.retain(|_, cached| &cached.token != token);
        }
    }
}
