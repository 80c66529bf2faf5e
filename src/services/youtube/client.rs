use reqwest::Client;
use url::Url;

use crate::ports::accounts::Token;
use crate::ports::youtube::YoutubeApi;
use crate::youtube_rs::client::{get_video, insert_playlist_item, list_my_channels};
use crate::youtube_rs::errors::ErrorKind;
use crate::youtube_rs::types::{Channel, InsertedItem, Video};
use crate::youtube_rs::video_id::VideoId;

pub struct YoutubeHttpAdapter {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

impl YoutubeHttpAdapter {
    pub fn new(base: Url, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl YoutubeApi for YoutubeHttpAdapter {
    async fn list_my_channels(&self, token: &Token) -> Result<Vec<Channel>, ErrorKind> {
        list_my_channels(&self.client, &self.base, token.secret()).await
    }

    async fn insert_playlist_item(
        &self,
        token: &Token,
        playlist_id: &str,
        video_id: &VideoId,
    ) -> Result<InsertedItem, ErrorKind> {
        insert_playlist_item(
            &self.client,
            &self.base,
            token.secret(),
            playlist_id,
            video_id.as_str(),
        )
        .await
    }

    async fn video_info(&self, video_id: &VideoId) -> Result<Video, ErrorKind> {
        let Some(api_key) = &self.api_key else {
            tracing::error!("No api_key configured, cannot look up videos");
            return Err(ErrorKind::Other);
        };
        get_video(&self.client, &self.base, api_key, video_id.as_str()).await
    }
}
