use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kirtan_pipeline::extractors::captions::CaptionTrackFetcher;
use kirtan_pipeline::extractors::youtube::YoutubeDataClient;
use kirtan_pipeline::utils::normalize_language_code;
use kirtan_pipeline::{output, ChannelPoller, Cli, Commands, Config, Pipeline, TranscriptFetcher, VideoId};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "kirtan_pipeline=debug"
    } else {
        "kirtan_pipeline=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            video,
            language,
            review,
            synthesize_audio,
            audio_output,
        } => {
            let mut config = Config::load()?;
            config.ensure_credentials()?;

            let settings = &mut config.pipeline;
            if let Some(language) = language {
                settings.target_language = normalize_language_code(&language);
            }
            if video.is_some() {
                settings.video_path = video;
            }
            settings.require_review |= review;
            settings.synthesize_audio |= synthesize_audio || audio_output.is_some();
            if let Some(path) = audio_output {
                settings.audio_path = path;
            }

            let pipeline = Pipeline::new(config).show_progress(!cli.quiet);
            let outcome = pipeline.run().await?;
            tracing::debug!(?outcome, "Run finished");
        }
        Commands::Latest => {
            let config = Config::load()?;
            config.ensure_youtube_credentials()?;

            let client = YoutubeDataClient::new(&config.youtube.api_key);
            match client.latest_video(&config.youtube.channel_id).await? {
                Some(video_id) => {
                    println!("Latest video: {}", video_id);
                    println!("  {}", video_id.watch_url());
                }
                None => println!("No videos found on channel {}", config.youtube.channel_id),
            }
        }
        Commands::Transcript {
            video_id,
            output,
            format,
        } => {
            let config = Config::load()?;
            let fetcher = CaptionTrackFetcher::new(config.pipeline.transcript_languages.clone());
            let transcript = fetcher.fetch_transcript(&VideoId::new(video_id)).await?;

            match output {
                Some(path) => {
                    output::save_to_file(&transcript, &path, &format)?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => output::print_to_console(&transcript, &format)?,
            }
        }
        Commands::Config { show, init } => {
            if init {
                let path = Config::default().save()?;
                println!("Configuration template written to: {}", path.display());
                if let Some(local) = Config::local_config_path() {
                    println!(
                        "Note: {} in the current directory takes precedence over it.",
                        local.display()
                    );
                }
            } else if show {
                Config::load()?.display();
            } else {
                println!("Configuration is read from config.yaml and these environment variables:");
                println!("  YOUTUBE_API_KEY, YOUTUBE_CHANNEL_ID");
                println!("  FACEBOOK_PAGE_ID, FACEBOOK_APP_ID, FACEBOOK_APP_SECRET, FACEBOOK_ACCESS_TOKEN");
                println!("Use --show to print the current values or --init to write a template.");
            }
        }
    }

    Ok(())
}
