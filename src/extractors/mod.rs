use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod captions;
pub mod youtube;

use crate::Result;

/// Opaque identifier of a YouTube video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub const WATCH_BASE_URL: &'static str = "https://www.youtube.com/watch";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("{}?v={}", Self::WATCH_BASE_URL, self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One caption line with its timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    /// Caption text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// Caption text of a video, in time order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,

    /// Language code of the caption track
    pub language: Option<String>,

    /// Whether the track was generated by speech recognition
    pub auto_generated: bool,

    /// Segments joined by single spaces
    pub text: String,

    pub segments: Vec<CaptionSegment>,
}

impl Transcript {
    pub fn from_segments(video_id: VideoId, segments: Vec<CaptionSegment>) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            video_id,
            language: None,
            auto_generated: false,
            text,
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Finds the newest video on a channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelPoller: Send + Sync {
    /// Most recent video of the channel, `None` if it has none
    async fn latest_video(&self, channel_id: &str) -> Result<Option<VideoId>>;
}

/// Retrieves the caption transcript of a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, start: f64) -> CaptionSegment {
        CaptionSegment {
            text: text.to_string(),
            start,
            duration: 1.5,
        }
    }

    #[test]
    fn test_transcript_joins_segments_with_spaces() {
        let transcript = Transcript::from_segments(
            VideoId::from("abc123"),
            vec![segment("hello", 0.0), segment("world", 1.5)],
        );

        assert_eq!(transcript.text, "hello world");
        assert_eq!(transcript.segments.len(), 2);
        assert!(!transcript.is_empty());
    }

    #[test]
    fn test_transcript_without_segments_is_empty() {
        let transcript = Transcript::from_segments(VideoId::from("abc123"), Vec::new());
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_video_id_watch_url() {
        let id = VideoId::from("abc123");
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=abc123");
        assert_eq!(id.to_string(), "abc123");
    }
}
