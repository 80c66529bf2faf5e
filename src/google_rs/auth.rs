use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use reqwest::Client;
use sha2::{Digest, Sha256};
use url::Url;

use crate::google_rs::types::{
    GoogleAuthResponse, GoogleTokenError, GoogleTokenResponse, OAuthSession,
};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Full read/write access, needed to insert playlist items
pub const SCOPE_YOUTUBE: &str = "https://www.googleapis.com/auth/youtube";

/// Characters RFC 7636 allows in a code verifier
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
const VERIFIER_LENGTH: usize = 96;
const STATE_LENGTH: usize = 24;

fn random_token(length: usize) -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| UNRESERVED[rng.random_range(0..UNRESERVED.len())] as char)
        .take(length)
        .collect()
}

/// A PKCE verifier and its S256 challenge.
struct Pkce {
    verifier: String,
    challenge: String,
}

impl Pkce {
    fn generate() -> Self {
        let verifier = random_token(VERIFIER_LENGTH);
        let challenge = s256_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }
}

fn s256_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Initiate the Google OAuth flow with PKCE.
/// Returns the authorization URL and the session needed to redeem the code.
///
/// `login_hint` preselects the account on the consent screen.
pub fn initiate_oauth(
    authorize_url: &Url,
    client_id: &str,
    redirect_uri: &str,
    login_hint: Option<&str>,
) -> (GoogleAuthResponse, OAuthSession) {
    let Pkce {
        verifier: code_verifier,
        challenge: code_challenge,
    } = Pkce::generate();
    let state = random_token(STATE_LENGTH);

    let mut auth_url = authorize_url.clone();
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", &state)
        .append_pair("scope", SCOPE_YOUTUBE)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("code_challenge", &code_challenge)
        .append_pair("code_challenge_method", "S256");
    if let Some(hint) = login_hint {
        auth_url.query_pairs_mut().append_pair("login_hint", hint);
    }

    let session = OAuthSession {
        code_verifier,
        state,
        created_at: chrono::Utc::now().timestamp(),
    };

    let response = GoogleAuthResponse {
        auth_url: auth_url.to_string(),
    };

    (response, session)
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeCodeForTokenError {
    #[error("Invalid code: {reason}")]
    InvalidCode { reason: String },
    #[error("No refresh token was issued, revoke the app's access and log in again")]
    MissingRefreshToken,
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response")]
    FailedToParseResponse(reqwest::Error),
}

/// Exchange an authorization code for an access and refresh token
/// https://developers.google.com/identity/protocols/oauth2/native-app#exchange-authorization-code
pub async fn exchange_code_for_token(
    client: &Client,
    token_url: &Url,
    client_id: &str,
    client_secret: &str,
    code: &str,
    session: &OAuthSession,
    // Must match the redirect URI used to build the authorization URL
    redirect_uri: &str,
) -> Result<GoogleTokenResponse, ExchangeCodeForTokenError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("code_verifier", session.code_verifier.as_str()),
    ];

    let response = client
        .post(token_url.clone())
        .form(&params)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(ExchangeCodeForTokenError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(ExchangeCodeForTokenError::InvalidCode {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    let token_response: GoogleTokenResponse = response
        .json()
        .await
        .map_err(ExchangeCodeForTokenError::FailedToParseResponse)?;

    if token_response.refresh_token.is_none() {
        return Err(ExchangeCodeForTokenError::MissingRefreshToken);
    }

    Ok(token_response)
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    /// The grant was revoked or expired, the user has to consent again
    #[error("Refresh token no longer valid: {reason}")]
    ConsentRequired { reason: String },
    #[error("Access was denied")]
    AccessDenied,
    #[error("Token endpoint rejected the request: {reason}")]
    Rejected { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Refresh an access token using a refresh token
pub async fn refresh_access_token(
    client: &Client,
    token_url: &Url,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<GoogleTokenResponse, RefreshTokenError> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ];

    let response = client
        .post(token_url.clone())
        .form(&params)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(RefreshTokenError::FailedToSendRequest)?;

    if !response.status().is_success() {
        let text = response
            .text()
            .await
            .unwrap_or("Failed to get error text".to_string());
        return Err(classify_refresh_error(&text));
    }

    let token_response: GoogleTokenResponse = response
        .json()
        .await
        .map_err(RefreshTokenError::FailedToParseResponse)?;

    Ok(token_response)
}

fn classify_refresh_error(body: &str) -> RefreshTokenError {
    let Ok(error) = serde_json::from_str::<GoogleTokenError>(body) else {
        return RefreshTokenError::Rejected {
            reason: body.to_string(),
        };
    };
    let reason = error.error_description.unwrap_or(error.error.clone());
    match error.error.as_str() {
        "invalid_grant" | "invalid_token" => RefreshTokenError::ConsentRequired { reason },
        "access_denied" => RefreshTokenError::AccessDenied,
        _ => RefreshTokenError::Rejected { reason },
    }
}
