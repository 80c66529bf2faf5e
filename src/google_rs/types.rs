use serde::{Deserialize, Serialize};

/// Google OAuth token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

/// Error body of the token endpoint, e.g. `{"error":"invalid_grant"}`
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// PKCE OAuth session data, kept until the authorization code comes back
#[derive(Debug, Clone)]
pub struct OAuthSession {
    pub code_verifier: String,
    pub state: String,
    pub created_at: i64,
}

/// Response for authentication initiation
#[derive(Debug, Clone)]
pub struct GoogleAuthResponse {
    pub auth_url: String,
}
