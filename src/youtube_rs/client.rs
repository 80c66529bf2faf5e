use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::youtube_rs::errors::{ErrorKind, translate_body, translate_transport};
use crate::youtube_rs::types::{
    Channel, Channels, InsertedItem, InsertedItemResponse, PlaylistItem, Video, Videos,
};

pub const YOUTUBE_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

fn endpoint(base: &Url, path: &str) -> Result<Url, ErrorKind> {
    base.join(path).map_err(|error| {
        tracing::error!("Invalid YouTube endpoint {}{}: {}", base, path, error);
        ErrorKind::Other
    })
}

/// Decode a successful body, or translate the failure.
async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ErrorKind> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .bytes()
            .await
            .map_err(|error| translate_transport(&error))?;
        return Err(translate_body(status, &body));
    }

    response.json::<T>().await.map_err(|error| {
        tracing::debug!("Failed to decode YouTube response: {}", error);
        ErrorKind::Other
    })
}

/// `GET channels?part=contentDetails,snippet&maxResults=50&mine=true`
pub async fn list_my_channels(
    client: &Client,
    base: &Url,
    access_token: &str,
) -> Result<Vec<Channel>, ErrorKind> {
    let url = endpoint(base, "channels")?;
    let response = client
        .get(url)
        .query(&[
            ("part", "contentDetails,snippet"),
            ("maxResults", "50"),
            ("mine", "true"),
        ])
        .bearer_auth(access_token)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|error| translate_transport(&error))?;

    let channels: Channels = read_response(response).await?;
    Ok(channels.items)
}

/// `POST playlistItems?part=snippet`
pub async fn insert_playlist_item(
    client: &Client,
    base: &Url,
    access_token: &str,
    playlist_id: &str,
    video_id: &str,
) -> Result<InsertedItem, ErrorKind> {
    let url = endpoint(base, "playlistItems")?;
    let response = client
        .post(url)
        .query(&[("part", "snippet")])
        .bearer_auth(access_token)
        .json(&PlaylistItem::video(playlist_id, video_id))
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|error| translate_transport(&error))?;

    let item: InsertedItemResponse = read_response(response).await?;
    Ok(item.into())
}

/// `GET videos?part=snippet,contentDetails&maxResults=1&id=..&key=..`, no user auth
pub async fn get_video(
    client: &Client,
    base: &Url,
    api_key: &str,
    video_id: &str,
) -> Result<Video, ErrorKind> {
    let url = endpoint(base, "videos")?;
    let response = client
        .get(url)
        .query(&[
            ("part", "snippet,contentDetails"),
            ("maxResults", "1"),
            ("id", video_id),
            ("key", api_key),
        ])
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|error| translate_transport(&error))?;

    let videos: Videos = read_response(response).await?;
    videos
        .items
        .into_iter()
        .next()
        .ok_or(ErrorKind::VideoNotFound)
}
