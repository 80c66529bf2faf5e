use color_eyre::eyre::{Result, WrapErr, eyre};
use url::Url;

use crate::google_rs::auth::exchange_code_for_token;
use crate::google_rs::types::OAuthSession;
use crate::services::accounts::GoogleAccountStore;

/// Authorization codes are short lived, so are login sessions
const SESSION_TTL_SECONDS: i64 = 10 * 60;

/// Pull the authorization code out of what the user pasted.
///
/// Accepts the full redirect URL (checked against the session state) or the
/// bare code.
pub fn extract_authorization_code(input: &str, session: &OAuthSession) -> Result<String> {
    if chrono::Utc::now().timestamp() - session.created_at > SESSION_TTL_SECONDS {
        return Err(eyre!("Login session expired, start the login again"));
    }

    let input = input.trim();
    if input.is_empty() {
        return Err(eyre!("No authorization code given"));
    }

    let Ok(redirect) = Url::parse(input) else {
        return Ok(input.to_string());
    };

    let mut code = None;
    let mut state = None;
    for (key, value) in redirect.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(eyre!("Authorization failed: {}", value)),
            _ => {}
        }
    }

    if state.as_deref() != Some(session.state.as_str()) {
        return Err(eyre!("State mismatch, start the login again"));
    }
    code.ok_or_else(|| eyre!("Redirect URL has no code parameter"))
}

/// Redeem the code and store the account's refresh token.
pub async fn complete_login(
    store: &GoogleAccountStore,
    account_name: &str,
    code: &str,
    session: &OAuthSession,
) -> Result<()> {
    let oauth = store.oauth();
    let response = exchange_code_for_token(
        store.client(),
        &oauth.token_url,
        &oauth.client_id,
        &oauth.client_secret,
        code,
        session,
        &oauth.redirect_uri,
    )
    .await
    .wrap_err("Failed to exchange authorization code")?;

    let refresh_token = response
        .refresh_token
        .ok_or_else(|| eyre!("No refresh token was issued"))?;
    store.add_account(account_name, &refresh_token)
}
