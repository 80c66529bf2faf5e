use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::youtube_rs::types::YouTubeError;

pub const DAILY_LIMIT_EXCEEDED_UNREG: &str = "dailyLimitExceededUnreg";
pub const VIDEO_ALREADY_IN_PLAYLIST: &str = "videoAlreadyInPlaylist";
pub const PLAYLIST_CONTAINS_MAXIMUM_NUMBER_OF_VIDEOS: &str = "playlistContainsMaximumNumberOfVideos";
pub const VIDEO_NOT_FOUND: &str = "videoNotFound";

/// Every way adding a video can fail. The `Display` text is what the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[error("Watch Later needs access to your YouTube account")]
    NeedAccess,
    #[error("Could not reach YouTube, check your network connection")]
    Network,
    #[error("Something went wrong")]
    Other,
    #[error("Your Watch Later playlist is full")]
    PlaylistFull,
    #[error("This link does not point to a single video")]
    NotAVideo,
    /// Only used between the API client and the add workflow.
    #[error("The access token was rejected")]
    InvalidToken,
    #[error("This video does not exist")]
    VideoNotFound,
    #[error("This video is already in your Watch Later playlist")]
    AlreadyInPlaylist,
    #[error("No Google account is set up, log in with `watch-later login` first")]
    NoAccount,
    #[error("This account has no YouTube channel")]
    AccountHasNoChannel,
    #[error("Watch Later needs permission to use your accounts")]
    PermissionRequiredAccounts,
}

impl ErrorKind {
    /// Whether trying again can plausibly change the result.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ErrorKind::AlreadyInPlaylist | ErrorKind::NotAVideo | ErrorKind::VideoNotFound
        )
    }

    /// The kind to show outside the add workflow, where a rejected token
    /// cannot be refreshed.
    pub fn user_facing(self) -> ErrorKind {
        match self {
            ErrorKind::InvalidToken => ErrorKind::Other,
            kind => kind,
        }
    }
}

/// Map an unsuccessful YouTube response to an [`ErrorKind`].
///
/// `error` is the decoded error envelope, `None` when the body was not one.
pub fn translate(status: StatusCode, error: Option<&YouTubeError>) -> ErrorKind {
    let Some(error) = error else {
        return ErrorKind::Other;
    };
    let reason = error.first_reason().unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED => ErrorKind::InvalidToken,
        StatusCode::FORBIDDEN => match reason {
            DAILY_LIMIT_EXCEEDED_UNREG => ErrorKind::InvalidToken,
            PLAYLIST_CONTAINS_MAXIMUM_NUMBER_OF_VIDEOS => ErrorKind::PlaylistFull,
            _ => ErrorKind::NeedAccess,
        },
        StatusCode::NOT_FOUND if reason == VIDEO_NOT_FOUND => ErrorKind::VideoNotFound,
        StatusCode::CONFLICT if reason == VIDEO_ALREADY_IN_PLAYLIST => {
            ErrorKind::AlreadyInPlaylist
        }
        _ => ErrorKind::Other,
    }
}

/// Same as [`translate`], decoding the raw body first.
pub fn translate_body(status: StatusCode, body: &[u8]) -> ErrorKind {
    let error = serde_json::from_slice::<YouTubeError>(body).ok();
    if error.is_none() {
        tracing::debug!(
            "Expected a youtube api error response for status {}, got: {}",
            status,
            String::from_utf8_lossy(body)
        );
    }
    translate(status, error.as_ref())
}

/// A request that never produced a response.
pub fn translate_transport(error: &reqwest::Error) -> ErrorKind {
    tracing::debug!("YouTube request failed without response: {}", error);
    if error.is_decode() {
        ErrorKind::Other
    } else {
        ErrorKind::Network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(code: u16, reason: &str) -> Vec<u8> {
        serde_json::json!({
            "error": {
                "code": code,
                "message": "boom",
                "errors": [{ "domain": "youtube.playlistItem", "reason": reason, "message": "boom" }]
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_already_in_playlist() {
        let body = envelope(409, VIDEO_ALREADY_IN_PLAYLIST);
        assert_eq!(
            translate_body(StatusCode::CONFLICT, &body),
            ErrorKind::AlreadyInPlaylist
        );
    }

    #[test]
    fn test_conflict_with_other_reason() {
        let body = envelope(409, "somethingElse");
        assert_eq!(translate_body(StatusCode::CONFLICT, &body), ErrorKind::Other);
    }

    #[test]
    fn test_unauthorized_needs_an_error_body() {
        assert_eq!(
            translate_body(StatusCode::UNAUTHORIZED, &envelope(401, "authError")),
            ErrorKind::InvalidToken
        );
        assert_eq!(
            translate_body(StatusCode::UNAUTHORIZED, br#"{"error":{"code":401,"message":"x"}}"#),
            ErrorKind::InvalidToken
        );
        assert_eq!(
            translate_body(StatusCode::UNAUTHORIZED, b"<html>nope</html>"),
            ErrorKind::Other
        );
        assert_eq!(translate(StatusCode::UNAUTHORIZED, None), ErrorKind::Other);
    }

    #[test]
    fn test_forbidden_reasons() {
        assert_eq!(
            translate_body(StatusCode::FORBIDDEN, &envelope(403, DAILY_LIMIT_EXCEEDED_UNREG)),
            ErrorKind::InvalidToken
        );
        assert_eq!(
            translate_body(
                StatusCode::FORBIDDEN,
                &envelope(403, PLAYLIST_CONTAINS_MAXIMUM_NUMBER_OF_VIDEOS)
            ),
            ErrorKind::PlaylistFull
        );
        assert_eq!(
            translate_body(StatusCode::FORBIDDEN, &envelope(403, "insufficientPermissions")),
            ErrorKind::NeedAccess
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            translate_body(StatusCode::NOT_FOUND, &envelope(404, VIDEO_NOT_FOUND)),
            ErrorKind::VideoNotFound
        );
        assert_eq!(
            translate_body(StatusCode::NOT_FOUND, &envelope(404, "playlistNotFound")),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_envelope_without_details() {
        let body = br#"{"error":{"code":403,"message":"Forbidden"}}"#;
        assert_eq!(translate_body(StatusCode::FORBIDDEN, body), ErrorKind::NeedAccess);
    }

    #[test]
    fn test_unparseable_body_is_other() {
        for status in [
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::CONFLICT,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            assert_eq!(translate_body(status, b"not json"), ErrorKind::Other);
        }
    }

    #[test]
    fn test_unknown_status_is_other() {
        assert_eq!(
            translate_body(StatusCode::BAD_REQUEST, &envelope(400, VIDEO_NOT_FOUND)),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_user_facing_hides_invalid_token() {
        let unregistered = translate_body(
            StatusCode::FORBIDDEN,
            &envelope(403, DAILY_LIMIT_EXCEEDED_UNREG),
        );
        assert_eq!(unregistered.user_facing(), ErrorKind::Other);
        assert_eq!(ErrorKind::VideoNotFound.user_facing(), ErrorKind::VideoNotFound);
        assert_eq!(ErrorKind::Network.user_facing(), ErrorKind::Network);
    }

    #[test]
    fn test_retry_affordance() {
        assert!(ErrorKind::NoAccount.is_retryable());
        assert!(ErrorKind::PlaylistFull.is_retryable());
        assert!(ErrorKind::AccountHasNoChannel.is_retryable());
        assert!(!ErrorKind::AlreadyInPlaylist.is_retryable());
        assert!(!ErrorKind::NotAVideo.is_retryable());
        assert!(!ErrorKind::VideoNotFound.is_retryable());
    }
}
