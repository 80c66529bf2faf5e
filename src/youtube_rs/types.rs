use serde::{Deserialize, Serialize};

/// Response of `GET /channels?mine=true`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channels {
    #[serde(default)]
    pub items: Vec<Channel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(default)]
    pub snippet: Option<ChannelSnippet>,
    #[serde(default)]
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnippet {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    #[serde(default)]
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPlaylists {
    pub watch_later: Option<String>,
}

impl Channel {
    pub fn title(&self) -> Option<&str> {
        self.snippet
            .as_ref()
            .and_then(|snippet| snippet.title.as_deref())
            .filter(|title| !title.is_empty())
    }

    pub fn watch_later_playlist_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|details| details.related_playlists.watch_later.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Body and response of `POST /playlistItems?part=snippet`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub playlist_id: String,
    pub resource_id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    pub video_id: String,
}

pub const RESOURCE_KIND_VIDEO: &str = "youtube#video";

impl PlaylistItem {
    pub fn video(playlist_id: &str, video_id: &str) -> Self {
        Self {
            snippet: PlaylistItemSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId {
                    kind: RESOURCE_KIND_VIDEO.to_string(),
                    video_id: video_id.to_string(),
                },
                title: None,
                description: None,
            },
        }
    }
}

/// The part of an inserted playlist item the user gets to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertedItem {
    pub title: String,
    pub description: String,
}

/// Inserted items echo only what the server filled in, everything else is optional.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InsertedItemResponse {
    #[serde(default)]
    pub snippet: Option<InsertedSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InsertedSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<InsertedItemResponse> for InsertedItem {
    fn from(response: InsertedItemResponse) -> Self {
        let snippet = response.snippet;
        Self {
            title: snippet
                .as_ref()
                .and_then(|s| s.title.clone())
                .unwrap_or_default(),
            description: snippet.and_then(|s| s.description).unwrap_or_default(),
        }
    }
}

/// Response of `GET /videos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub snippet: VideoSnippet,
    pub content_details: VideoContentDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    pub medium: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoContentDetails {
    /// ISO 8601 duration, e.g. `PT4M13S`
    pub duration: String,
}

/// YouTube Data API error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeError {
    pub error: RootError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootError {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub errors: Option<Vec<ErrorDetail>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub domain: String,
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl YouTubeError {
    pub fn first_reason(&self) -> Option<&str> {
        self.error
            .errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(|detail| detail.reason.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_item_body() {
        let body = serde_json::to_value(PlaylistItem::video("WL", "abc")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "snippet": {
                    "playlistId": "WL",
                    "resourceId": { "kind": "youtube#video", "videoId": "abc" }
                }
            })
        );
    }

    #[test]
    fn test_channel_accessors() {
        let channels: Channels = serde_json::from_str(
            r#"{"items":[{"snippet":{"title":""},"contentDetails":{"relatedPlaylists":{"likes":"LL"}}}]}"#,
        )
        .unwrap();
        let channel = &channels.items[0];
        assert_eq!(channel.title(), None);
        assert_eq!(channel.watch_later_playlist_id(), None);
    }

    #[test]
    fn test_inserted_item_defaults() {
        let response: InsertedItemResponse =
            serde_json::from_str(r#"{"snippet":{"title":"T"}}"#).unwrap();
        assert_eq!(
            InsertedItem::from(response),
            InsertedItem {
                title: "T".into(),
                description: String::new()
            }
        );
    }
}
