//! Kirtan Pipeline - posts translated YouTube transcripts to a Facebook Page
//!
//! This library wires together four web APIs: the YouTube Data API to find a
//! channel's newest video, YouTube captions to read its transcript, Google
//! Translate to render it in English, and the Facebook Graph API to publish it.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod speech;
pub mod translate;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{CaptionSegment, ChannelPoller, Transcript, TranscriptFetcher, VideoId};
pub use pipeline::{Pipeline, RunOutcome};
pub use publish::{PagePost, PublishReceipt, Publisher};
pub use speech::SpeechSynthesizer;
pub use translate::{Translation, Translator};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the pipeline
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("API keys are not set ({}). Please update placeholder values or set environment variables.", .0.join(", "))]
    PlaceholderCredentials(Vec<&'static str>),

    #[error("{service} API error: {status} - {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Transcript unavailable for video {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("Translation service returned no text")]
    EmptyTranslation,

    #[error("Unexpected response from {service}: {detail}")]
    InvalidResponse {
        service: &'static str,
        detail: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}
