use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::LazyLock;
use url::Url;

use super::{CaptionSegment, Transcript, TranscriptFetcher, VideoId};
use crate::{PipelineError, Result};

static CAPTIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"captions":(\{.*?\}),"videoDetails""#).unwrap());

/// Reads caption tracks the way the YouTube web player does
pub struct CaptionTrackFetcher {
    client: Client,
    preferred_languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsData {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `asr` for speech-recognition tracks
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// `fmt=json3` timed text document
#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    segs: Option<Vec<TimedTextSeg>>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

impl CaptionTrackFetcher {
    pub fn new(preferred_languages: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            preferred_languages,
        }
    }

    #[cfg(test)]
    fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String> {
        let response = self
            .client
            .get(video_id.watch_url())
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to load watch page: HTTP {}", response.status());
        }

        Ok(response.text().await?)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionSegment>> {
        let url = json3_url(&track.base_url)?;
        tracing::debug!(language = %track.language_code, "Downloading caption track");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        let body = response.text().await?;
        parse_timed_text(&body)
    }
}

#[async_trait]
impl TranscriptFetcher for CaptionTrackFetcher {
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript> {
        let unavailable = |reason: &str| PipelineError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: reason.to_string(),
        };

        let html = self
            .fetch_watch_page(video_id)
            .await
            .map_err(|e| unavailable(&format!("{:#}", e)))?;
        let tracks = extract_caption_tracks(&html).map_err(|reason| unavailable(&reason))?;

        let track = select_track(&tracks, &self.preferred_languages)
            .ok_or_else(|| unavailable("no caption tracks"))?;

        let segments = self
            .fetch_track(track)
            .await
            .map_err(|e| unavailable(&format!("{:#}", e)))?;

        let mut transcript = Transcript::from_segments(video_id.clone(), segments);
        transcript.language = Some(track.language_code.clone());
        transcript.auto_generated = track.is_generated();
        Ok(transcript)
    }
}

/// Pull the caption track list out of a watch page
pub fn extract_caption_tracks(html: &str) -> std::result::Result<Vec<CaptionTrack>, String> {
    let Some(captures) = CAPTIONS_RE.captures(html) else {
        if html.contains(r#"class="g-recaptcha""#) {
            return Err("YouTube is rate limiting requests".into());
        }
        return Err("captions are disabled for this video".into());
    };

    let data: CaptionsData = serde_json::from_str(&captures[1])
        .map_err(|e| format!("unreadable captions data: {}", e))?;

    let tracks = data
        .player_captions_tracklist_renderer
        .map(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err("no caption tracks".into());
    }
    Ok(tracks)
}

/// First preferred language wins, manual tracks before generated ones.
/// Without a match the first manual track (or else the first track) is used.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferred: &[String]) -> Option<&'a CaptionTrack> {
    preferred
        .iter()
        .find_map(|lang| {
            manual_first(
                tracks
                    .iter()
                    .filter(|t| t.language_code.eq_ignore_ascii_case(lang)),
            )
        })
        .or_else(|| manual_first(tracks.iter()))
}

fn manual_first<'a, I>(candidates: I) -> Option<&'a CaptionTrack>
where
    I: Iterator<Item = &'a CaptionTrack> + Clone,
{
    candidates
        .clone()
        .find(|t| !t.is_generated())
        .or_else(|| {
            let mut all = candidates;
            all.next()
        })
}

fn json3_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).context("Invalid caption track URL")?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut().clear().extend_pairs(pairs).append_pair("fmt", "json3");
    Ok(url)
}

/// Convert a json3 document into caption segments, dropping empty events
fn parse_timed_text(body: &str) -> Result<Vec<CaptionSegment>> {
    let doc: TimedText = serde_json::from_str(body).context("Failed to parse caption track")?;

    let segments = doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|s| s.utf8).collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(CaptionSegment {
                text,
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(segments)
}
