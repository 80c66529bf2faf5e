use std::fmt;

use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};

/// Account type of Google accounts, the only provider Watch Later talks to.
pub const ACCOUNT_TYPE_GOOGLE: &str = "com.google";

/// A Google account known to the account store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
}

impl Account {
    pub fn google(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account_type: ACCOUNT_TYPE_GOOGLE.to_string(),
        }
    }
}

/// Short lived OAuth bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Something the user has to do in a browser before a token can be issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentIntent {
    pub account: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("The user cancelled the token request")]
    Cancelled,
    #[error("Failed to reach the token endpoint: {0}")]
    Io(String),
    #[error("The user has to grant access first")]
    ConsentRequired(ConsentIntent),
    #[error("Failed to get a token: {0}")]
    Other(String),
}

/// Port trait wrapping the platform account store.
///
/// Implementations live in `services::accounts` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    fn list_accounts(&self, account_type: &str) -> Vec<Account>;

    async fn get_token(&self, account: &Account, scope: &str) -> Result<Token, TokenError>;

    async fn invalidate_token(&self, account_type: &str, token: &Token);
}

/// Port trait for the runtime grant needed before accounts may be used.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionGate: Send + Sync {
    /// Whether this platform asks for the grant at all.
    fn is_required(&self) -> bool;

    fn has_permission(&self) -> bool;

    /// Remember the user's answer.
    fn record(&self, granted: bool) -> Result<()>;
}
