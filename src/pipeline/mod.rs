use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

pub mod review;

pub use review::{ReviewGate, StdinReview};

use crate::config::Config;
use crate::extractors::captions::CaptionTrackFetcher;
use crate::extractors::youtube::YoutubeDataClient;
use crate::extractors::{ChannelPoller, Transcript, TranscriptFetcher, VideoId};
use crate::publish::{FacebookPublisher, GraphClient, PagePost, PublishReceipt, Publisher};
use crate::speech::{GoogleTtsClient, SpeechSynthesizer};
use crate::translate::{GoogleTranslateClient, Translation, Translator};
use crate::utils::{check_file_accessible, preview};
use crate::Result;

const PREVIEW_CHARS: usize = 200;

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The channel has no videos
    NoVideo,
    /// The video has no usable transcript
    NoTranscript { video_id: VideoId },
    /// The reviewer declined to publish
    Rejected { video_id: VideoId },
    /// The post went out, with the audio file if one was synthesized
    Published {
        video_id: VideoId,
        receipt: PublishReceipt,
        audio_path: Option<PathBuf>,
    },
}

/// The fixed sequence: latest video, transcript, translation, review, audio, post
pub struct Pipeline {
    config: Config,
    poller: Box<dyn ChannelPoller>,
    fetcher: Box<dyn TranscriptFetcher>,
    translator: Box<dyn Translator>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    publisher: Box<dyn Publisher>,
    review: Box<dyn ReviewGate>,
    show_progress: bool,
}

impl Pipeline {
    /// Create a pipeline talking to the real services
    pub fn new(config: Config) -> Self {
        let graph = GraphClient::new(&config.facebook.access_token, &config.facebook.api_version);

        Self {
            poller: Box::new(YoutubeDataClient::new(&config.youtube.api_key)),
            fetcher: Box::new(CaptionTrackFetcher::new(
                config.pipeline.transcript_languages.clone(),
            )),
            translator: Box::new(GoogleTranslateClient::new()),
            synthesizer: Box::new(GoogleTtsClient::new()),
            publisher: Box::new(FacebookPublisher::new(graph, &config.facebook.page_id)),
            review: Box::new(StdinReview),
            show_progress: true,
            config,
        }
    }

    pub fn with_poller(mut self, poller: impl ChannelPoller + 'static) -> Self {
        self.poller = Box::new(poller);
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl TranscriptFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: impl SpeechSynthesizer + 'static) -> Self {
        self.synthesizer = Box::new(synthesizer);
        self
    }

    pub fn with_publisher(mut self, publisher: impl Publisher + 'static) -> Self {
        self.publisher = Box::new(publisher);
        self
    }

    pub fn with_review(mut self, review: impl ReviewGate + 'static) -> Self {
        self.review = Box::new(review);
        self
    }

    /// Show spinners while waiting on the network
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run every stage once
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<RunOutcome> {
        println!("Starting the Kirtan pipeline...");
        let settings = &self.config.pipeline;

        if let Some(video) = &settings.video_path {
            check_file_accessible(video)?;
        }

        // 1. latest video
        println!("Fetching the latest YouTube video...");
        let Some(video_id) = self.latest_video().await? else {
            println!("No new videos found. Exiting.");
            return Ok(RunOutcome::NoVideo);
        };
        println!("Found video with ID: {}", video_id);

        // 2. transcript; the only stage whose failure is absorbed
        println!("Fetching video transcript...");
        let Some(transcript) = self.transcript(&video_id).await else {
            println!("Could not retrieve transcript. Exiting.");
            return Ok(RunOutcome::NoTranscript { video_id });
        };

        // 3. translation
        println!("Translating transcript...");
        let translation = self.translate(&transcript).await?;
        println!("Translated Text: {}", preview(&translation.text, PREVIEW_CHARS));

        // review
        if settings.require_review {
            if !self.review.approve(&translation).await? {
                println!("Publishing cancelled during review.");
                return Ok(RunOutcome::Rejected { video_id });
            }
        } else {
            tracing::warn!("Human review is disabled; the translation is published unreviewed");
        }

        // 4. audio
        let audio_path = if settings.synthesize_audio {
            println!("Generating audio from translated text...");
            let path = self
                .synthesizer
                .synthesize(&translation.text, &settings.target_language, &settings.audio_path)
                .await?;
            println!("Audio file created: {}", path.display());
            Some(path)
        } else {
            None
        };

        // 5. publish
        println!("Posting to Facebook...");
        let post = PagePost::new(
            &settings.post_preamble,
            &translation.text,
            settings.video_path.clone(),
        );
        let receipt = self.publisher.publish(&post).await?;

        tracing::info!(object_id = %receipt.object_id, kind = ?receipt.kind, "Published");
        println!("Pipeline finished successfully.");

        Ok(RunOutcome::Published {
            video_id,
            receipt,
            audio_path,
        })
    }

    async fn latest_video(&self) -> Result<Option<VideoId>> {
        let channel_id = &self.config.youtube.channel_id;
        let progress = self.spinner("Searching channel...");
        let result = self.poller.latest_video(channel_id).await;
        progress.finish_and_clear();

        let video_id = result?;
        tracing::info!(channel_id = %channel_id, video_id = ?video_id, "Channel search finished");
        Ok(video_id)
    }

    /// `None` when the transcript cannot be fetched or has no text
    async fn transcript(&self, video_id: &VideoId) -> Option<Transcript> {
        let progress = self.spinner("Downloading captions...");
        let result = self.fetcher.fetch_transcript(video_id).await;
        progress.finish_and_clear();

        match result {
            Ok(transcript) if transcript.is_empty() => {
                tracing::warn!(video_id = %video_id, "Transcript has no text");
                None
            }
            Ok(transcript) => {
                tracing::info!(
                    video_id = %video_id,
                    segments = transcript.segments.len(),
                    language = transcript.language.as_deref().unwrap_or("unknown"),
                    "Transcript fetched"
                );
                Some(transcript)
            }
            Err(e) => {
                tracing::error!(video_id = %video_id, error = %e, "Failed to fetch transcript");
                println!("Error getting transcript: {}", e);
                None
            }
        }
    }

    async fn translate(&self, transcript: &Transcript) -> Result<Translation> {
        let target = &self.config.pipeline.target_language;
        let progress = self.spinner("Translating...");
        let result = self.translator.translate(&transcript.text, target).await;
        progress.finish_and_clear();

        let translation = result?;
        tracing::info!(
            source_language = translation.source_language.as_deref().unwrap_or("unknown"),
            target_language = %target,
            "Transcript translated"
        );
        Ok(translation)
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message(message.to_string());
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}
