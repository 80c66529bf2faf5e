use crate::ports::accounts::Token;
use crate::youtube_rs::errors::ErrorKind;
use crate::youtube_rs::types::{Channel, InsertedItem, Video};
use crate::youtube_rs::video_id::VideoId;

/// Port trait wrapping the YouTube Data API calls used by the add workflow.
///
/// Errors are already translated, callers never see status codes.
/// Implementations live in `services::youtube::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait YoutubeApi: Send + Sync {
    async fn list_my_channels(&self, token: &Token) -> Result<Vec<Channel>, ErrorKind>;

    async fn insert_playlist_item(
        &self,
        token: &Token,
        playlist_id: &str,
        video_id: &VideoId,
    ) -> Result<InsertedItem, ErrorKind>;

    async fn video_info(&self, video_id: &VideoId) -> Result<Video, ErrorKind>;
}
