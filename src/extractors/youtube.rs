use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{ChannelPoller, VideoId};
use crate::utils::build_url;
use crate::{PipelineError, Result};

/// YouTube Data API v3 client for channel searches
pub struct YoutubeDataClient {
    client: Client,
    api_key: String,
}

/// Response of `search.list`
#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: ResourceId,
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    pub title: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl SearchListResponse {
    /// Id of the first search result, if any
    pub fn latest_video_id(&self) -> Option<VideoId> {
        self.items
            .first()
            .and_then(|item| item.id.video_id.as_deref())
            .map(VideoId::from)
    }
}

impl YoutubeDataClient {
    const SEARCH_URL: &'static str = "https://www.googleapis.com/youtube/v3/search";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// `search.list` request for a channel's single newest video
    pub fn search_url(&self, channel_id: &str) -> Result<Url> {
        build_url(
            Self::SEARCH_URL,
            &[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("maxResults", "1"),
                ("order", "date"),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ],
        )
    }

    /// Call `search.list` for the newest video of a channel
    pub async fn search_latest(&self, channel_id: &str) -> Result<SearchListResponse> {
        let url = self.search_url(channel_id)?;

        tracing::debug!("Searching channel {} for its latest video", channel_id);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to reach YouTube Data API"))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(PipelineError::Api {
                service: "YouTube Data",
                status: status.as_u16(),
                message,
            }
            .into());
        }

        serde_json::from_str(&body).context("Failed to parse YouTube search response")
    }
}

#[async_trait]
impl ChannelPoller for YoutubeDataClient {
    async fn latest_video(&self, channel_id: &str) -> Result<Option<VideoId>> {
        let response = self.search_latest(channel_id).await?;

        if let Some(snippet) = response.items.first().and_then(|i| i.snippet.as_ref()) {
            tracing::debug!(
                title = snippet.title.as_deref().unwrap_or_default(),
                published_at = snippet.published_at.as_deref().unwrap_or_default(),
                "Latest search result"
            );
        }

        Ok(response.latest_video_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_search_url_asks_for_newest_video() {
        let client = YoutubeDataClient::new("yt-key");
        let url = client.search_url("UCkirtan").unwrap();
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert_eq!(
            url.as_str().split('?').next(),
            Some("https://www.googleapis.com/youtube/v3/search")
        );
        assert_eq!(query.len(), 6);
        assert_eq!(query["part"], "snippet");
        assert_eq!(query["channelId"], "UCkirtan");
        assert_eq!(query["maxResults"], "1");
        assert_eq!(query["order"], "date");
        assert_eq!(query["type"], "video");
        assert_eq!(query["key"], "yt-key");
    }

    #[test]
    fn test_empty_items_yields_no_video() {
        let response: SearchListResponse =
            serde_json::from_str(r#"{"kind":"youtube#searchListResponse","items":[]}"#).unwrap();
        assert_eq!(response.latest_video_id(), None);
    }

    #[test]
    fn test_missing_items_yields_no_video() {
        let response: SearchListResponse =
            serde_json::from_str(r#"{"kind":"youtube#searchListResponse"}"#).unwrap();
        assert_eq!(response.latest_video_id(), None);
    }

    #[test]
    fn test_first_item_video_id() {
        let body = r#"{
            "kind": "youtube#searchListResponse",
            "items": [{
                "kind": "youtube#searchResult",
                "id": {"kind": "youtube#video", "videoId": "abc123"},
                "snippet": {"title": "Asa di Vaar", "publishedAt": "2024-05-01T04:00:00Z"}
            }]
        }"#;
        let response: SearchListResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.latest_video_id(), Some(VideoId::from("abc123")));
        let snippet = response.items[0].snippet.as_ref().unwrap();
        assert_eq!(snippet.title.as_deref(), Some("Asa di Vaar"));
    }

    #[test]
    fn test_error_envelope_message() {
        let body = r#"{"error":{"code":403,"message":"API key not valid","errors":[]}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.message, "API key not valid");
    }
}
