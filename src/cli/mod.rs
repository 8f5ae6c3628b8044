use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kirtan-pipeline",
    about = "Kirtan Pipeline - Translate the latest YouTube video transcript and post it to a Facebook Page",
    version,
    long_about = "A one-shot CLI job that finds the newest video on a YouTube channel, fetches its captions, translates them to English and publishes the result to a Facebook Page feed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline once: latest video, transcript, translation, post
    Run {
        /// Upload this video file with the translation as its description instead of a text post
        #[arg(long, value_name = "FILE")]
        video: Option<PathBuf>,

        /// Target language code for the translation (default: en)
        #[arg(short, long, value_name = "LANG", env = "KIRTAN_TARGET_LANGUAGE")]
        language: Option<String>,

        /// Pause for human review of the translation before publishing
        #[arg(long)]
        review: bool,

        /// Generate a speech audio file from the translation
        #[arg(long)]
        synthesize_audio: bool,

        /// Where to write the synthesized audio (implies --synthesize-audio)
        #[arg(long, value_name = "FILE")]
        audio_output: Option<PathBuf>,
    },

    /// Print the newest video on the configured channel
    Latest,

    /// Fetch and print the transcript of a video
    Transcript {
        /// YouTube video id
        #[arg(value_name = "VIDEO_ID")]
        video_id: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or initialise the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a template configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with segment timings
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
