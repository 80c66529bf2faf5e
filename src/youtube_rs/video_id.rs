use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::youtube_rs::errors::ErrorKind;

/// Identifier of a single YouTube video, as extracted from a shared link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a user supplied link. Anything that is not a URL is not a video.
pub fn parse_video_link(input: &str) -> Result<VideoId, ErrorKind> {
    let uri = Url::parse(input.trim()).map_err(|_| ErrorKind::NotAVideo)?;
    parse_video_id(&uri)
}

/// Extract the video id from any of the link shapes YouTube hands out:
///
/// - `vnd.youtube:ID`
/// - `https://www.youtube.com/watch?v=ID`
/// - `https://www.youtube.com/attribution_link?u=/watch%3Fv%3DID`
/// - `https://www.youtube.com/v/ID`, `/embed/ID`, `https://youtu.be/ID`
///
/// Playlist links (`?list=`) are rejected with [`ErrorKind::NotAVideo`].
pub fn parse_video_id(uri: &Url) -> Result<VideoId, ErrorKind> {
    if uri.cannot_be_a_base() {
        return non_empty(decode(uri.path()));
    }

    if let Some(id) = query_parameter(uri, "v") {
        return non_empty(id);
    }

    if query_parameter(uri, "list").is_some() {
        return Err(ErrorKind::NotAVideo);
    }

    let mut segments = uri.path_segments().into_iter().flatten();
    if segments.next() == Some("attribution_link") {
        let target = query_parameter(uri, "u").ok_or(ErrorKind::NotAVideo)?;
        // `u` is usually a relative link, resolve it against the outer one
        let target = uri.join(&decode(&target)).map_err(|_| ErrorKind::NotAVideo)?;
        return parse_video_id(&target);
    }

    let last = uri
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .ok_or(ErrorKind::NotAVideo)?;
    non_empty(decode(last))
}

fn query_parameter(uri: &Url, name: &str) -> Option<String> {
    uri.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn non_empty(id: String) -> Result<VideoId, ErrorKind> {
    if id.is_empty() {
        Err(ErrorKind::NotAVideo)
    } else {
        Ok(VideoId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<VideoId, ErrorKind> {
        parse_video_link(input)
    }

    #[test]
    fn test_watch_link() {
        assert_eq!(
            parse("https://www.youtube.com/watch?v=jqxENMKaeCU").unwrap(),
            VideoId::new("jqxENMKaeCU")
        );
    }

    #[test]
    fn test_watch_link_with_extra_parameters() {
        assert_eq!(
            parse("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42").unwrap(),
            VideoId::new("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_video_parameter_wins_over_playlist() {
        assert_eq!(
            parse("https://www.youtube.com/watch?v=abc123&list=PLxLNk7y0uwqfXzUjcbVT3UuMjRd7pOv_U")
                .unwrap(),
            VideoId::new("abc123")
        );
    }

    #[test]
    fn test_playlist_link_is_not_a_video() {
        assert_eq!(
            parse("https://www.youtube.com/playlist?list=PLxLNk7y0uwqfXzUjcbVT3UuMjRd7pOv_U"),
            Err(ErrorKind::NotAVideo)
        );
    }

    #[test]
    fn test_opaque_link() {
        assert_eq!(
            parse("vnd.youtube:jqxENMKaeCU").unwrap(),
            VideoId::new("jqxENMKaeCU")
        );
    }

    #[test]
    fn test_short_link() {
        assert_eq!(
            parse("http://youtu.be/jqxENMKaeCU").unwrap(),
            VideoId::new("jqxENMKaeCU")
        );
    }

    #[test]
    fn test_embed_and_v_links() {
        assert_eq!(
            parse("http://www.youtube.com/embed/UkWd0azv3fQ").unwrap(),
            VideoId::new("UkWd0azv3fQ")
        );
        assert_eq!(
            parse("http://www.youtube.com/v/OdT9z-JjtJk").unwrap(),
            VideoId::new("OdT9z-JjtJk")
        );
    }

    #[test]
    fn test_attribution_link() {
        assert_eq!(
            parse(
                "http://www.youtube.com/attribution_link?u=/watch%3Fv%3DJ1zNbWJC5aw%26feature%3Dem-subs_digest"
            )
            .unwrap(),
            VideoId::new("J1zNbWJC5aw")
        );
    }

    #[test]
    fn test_attribution_link_with_absolute_target() {
        assert_eq!(
            parse("https://www.youtube.com/attribution_link?u=https%3A%2F%2Fyoutu.be%2FJ1zNbWJC5aw")
                .unwrap(),
            VideoId::new("J1zNbWJC5aw")
        );
    }

    #[test]
    fn test_attribution_link_without_target() {
        assert_eq!(
            parse("https://www.youtube.com/attribution_link?a=b"),
            Err(ErrorKind::NotAVideo)
        );
    }

    #[test]
    fn test_attribution_link_to_playlist() {
        assert_eq!(
            parse("https://www.youtube.com/attribution_link?u=/playlist%3Flist%3DPL123"),
            Err(ErrorKind::NotAVideo)
        );
    }

    #[test]
    fn test_empty_path_is_not_a_video() {
        assert_eq!(parse("https://www.youtube.com/"), Err(ErrorKind::NotAVideo));
        assert_eq!(parse("https://www.youtube.com/watch?v="), Err(ErrorKind::NotAVideo));
    }

    #[test]
    fn test_garbage_is_not_a_video() {
        assert_eq!(parse("not a link at all"), Err(ErrorKind::NotAVideo));
        assert_eq!(parse(""), Err(ErrorKind::NotAVideo));
    }
}
