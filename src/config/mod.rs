use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::mask_secret;
use crate::PipelineError;

const CONFIG_FILE: &str = "config.yaml";
const APP_DIR: &str = "kirtan-pipeline";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube configuration
    pub youtube: YoutubeConfig,

    /// Facebook configuration
    pub facebook: FacebookConfig,

    /// Pipeline settings
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// YouTube Data API key
    pub api_key: String,

    /// Channel to poll for new videos
    pub channel_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookConfig {
    /// Page receiving the posts
    pub page_id: String,

    pub app_id: String,

    pub app_secret: String,

    /// Page access token
    pub access_token: String,

    /// Graph API version segment, e.g. `v19.0`
    pub api_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Language the transcript is translated into
    pub target_language: String,

    /// Text placed before the translation in the post
    pub post_preamble: String,

    /// Caption languages to prefer, in order. Empty means the first available track.
    pub transcript_languages: Vec<String>,

    /// Block on a human review prompt before publishing
    pub require_review: bool,

    /// Generate a speech audio file from the translation
    pub synthesize_audio: bool,

    /// Where synthesized audio is written
    pub audio_path: PathBuf,

    /// Upload this video instead of posting text
    pub video_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_language: "en".to_string(),
            post_preamble: "Listen to the latest Kirtan!\n\nEnglish Translation:\n".to_string(),
            transcript_languages: Vec::new(),
            require_review: false,
            synthesize_audio: false,
            audio_path: PathBuf::from("kirtan_audio.mp3"),
            video_path: None,
        }
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: "YOUR_YOUTUBE_API_KEY".to_string(),
            channel_id: "YOUR_YOUTUBE_CHANNEL_ID".to_string(),
        }
    }
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            page_id: "YOUR_FACEBOOK_PAGE_ID".to_string(),
            app_id: "YOUR_FACEBOOK_APP_ID".to_string(),
            app_secret: "YOUR_FACEBOOK_APP_SECRET".to_string(),
            access_token: "YOUR_FACEBOOK_ACCESS_TOKEN".to_string(),
            api_version: "v19.0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file (if any), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::existing_config_path() {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                let content = fs_err::read_to_string(&path)
                    .context("Failed to read config file")?;

                serde_yaml::from_str(&content).context("Failed to parse config file")?
            }
            None => Self::default(),
        };

        config.apply_env_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override values from the environment, `lookup` returning `None` for unset keys
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut String); 6] = [
            ("FACEBOOK_PAGE_ID", &mut self.facebook.page_id),
            ("FACEBOOK_APP_ID", &mut self.facebook.app_id),
            ("FACEBOOK_APP_SECRET", &mut self.facebook.app_secret),
            ("FACEBOOK_ACCESS_TOKEN", &mut self.facebook.access_token),
            ("YOUTUBE_API_KEY", &mut self.youtube.api_key),
            ("YOUTUBE_CHANNEL_ID", &mut self.youtube.channel_id),
        ];

        for (key, slot) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::default_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(config_path)
    }

    /// `config.yaml` in the working directory, which shadows the user config file
    pub fn local_config_path() -> Option<PathBuf> {
        Some(PathBuf::from(CONFIG_FILE)).filter(|path| path.exists())
    }

    /// First config file found: the working directory, then the user config directory
    fn existing_config_path() -> Option<PathBuf> {
        if let Some(local_config) = Self::local_config_path() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .filter(|path| path.exists())
    }

    fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.target_language.trim().is_empty() {
            return Err(PipelineError::Config("target language must not be empty".into()).into());
        }

        if !self.facebook.api_version.starts_with('v') {
            return Err(PipelineError::Config(format!(
                "Graph API version must look like `v19.0`, got `{}`",
                self.facebook.api_version
            ))
            .into());
        }

        Ok(())
    }

    /// Refuse to proceed while YouTube credentials are placeholders
    pub fn ensure_youtube_credentials(&self) -> Result<()> {
        let missing = self.placeholder_fields(false);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::PlaceholderCredentials(missing).into())
        }
    }

    /// Refuse to proceed while any credential the full run needs is a placeholder
    pub fn ensure_credentials(&self) -> Result<()> {
        let missing = self.placeholder_fields(true);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::PlaceholderCredentials(missing).into())
        }
    }

    fn placeholder_fields(&self, include_facebook: bool) -> Vec<&'static str> {
        let mut fields = vec![
            ("YOUTUBE_API_KEY", &self.youtube.api_key),
            ("YOUTUBE_CHANNEL_ID", &self.youtube.channel_id),
        ];
        if include_facebook {
            fields.push(("FACEBOOK_PAGE_ID", &self.facebook.page_id));
            fields.push(("FACEBOOK_ACCESS_TOKEN", &self.facebook.access_token));
        }

        fields
            .into_iter()
            .filter(|(_, value)| is_placeholder(value))
            .map(|(name, _)| name)
            .collect()
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  YouTube API Key: {}", mask_secret(&self.youtube.api_key));
        println!("  YouTube Channel: {}", self.youtube.channel_id);
        println!("  Facebook Page: {}", self.facebook.page_id);
        println!("  Facebook App ID: {}", self.facebook.app_id);
        println!("  Facebook App Secret: {}", mask_secret(&self.facebook.app_secret));
        println!("  Facebook Access Token: {}", mask_secret(&self.facebook.access_token));
        println!("  Graph API Version: {}", self.facebook.api_version);
        println!("  Target Language: {}", self.pipeline.target_language);
        println!("  Require Review: {}", self.pipeline.require_review);
        println!("  Synthesize Audio: {}", self.pipeline.synthesize_audio);
        if let Some(video) = &self.pipeline.video_path {
            println!("  Video Upload: {}", video.display());
        }
    }
}

/// Placeholder values all start with `YOUR_`
pub fn is_placeholder(value: &str) -> bool {
    value.trim().is_empty() || value.contains("YOUR_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_placeholders() {
        let config = Config::default();
        assert!(is_placeholder(&config.youtube.api_key));
        assert!(is_placeholder(&config.facebook.access_token));
        assert_eq!(config.pipeline.target_language, "en");
        assert!(!config.pipeline.require_review);
        assert!(!config.pipeline.synthesize_audio);
    }

    #[test]
    fn test_env_overrides_placeholders() {
        let vars = env(&[
            ("YOUTUBE_API_KEY", "yt-key"),
            ("YOUTUBE_CHANNEL_ID", "UC123"),
            ("FACEBOOK_PAGE_ID", "4242"),
            ("FACEBOOK_ACCESS_TOKEN", "EAAB"),
        ]);

        let mut config = Config::default();
        config.apply_env_with(|key| vars.get(key).cloned());

        assert_eq!(config.youtube.api_key, "yt-key");
        assert_eq!(config.youtube.channel_id, "UC123");
        assert_eq!(config.facebook.page_id, "4242");
        assert_eq!(config.facebook.access_token, "EAAB");
        assert_eq!(config.facebook.app_id, "YOUR_FACEBOOK_APP_ID");
        assert!(config.ensure_credentials().is_ok());
    }

    #[test]
    fn test_blank_env_value_is_ignored() {
        let vars = env(&[("YOUTUBE_API_KEY", "   ")]);

        let mut config = Config::default();
        config.apply_env_with(|key| vars.get(key).cloned());

        assert_eq!(config.youtube.api_key, "YOUR_YOUTUBE_API_KEY");
    }

    #[test]
    fn test_guard_reports_placeholder_fields() {
        let vars = env(&[("YOUTUBE_API_KEY", "yt-key"), ("YOUTUBE_CHANNEL_ID", "UC123")]);

        let mut config = Config::default();
        config.apply_env_with(|key| vars.get(key).cloned());

        assert!(config.ensure_youtube_credentials().is_ok());

        let err = config.ensure_credentials().unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::PlaceholderCredentials(fields)) => {
                assert_eq!(fields, &vec!["FACEBOOK_PAGE_ID", "FACEBOOK_ACCESS_TOKEN"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().starts_with("API keys are not set"));
    }

    #[test]
    fn test_yaml_without_pipeline_section_uses_defaults() {
        let yaml = r#"
youtube:
  api_key: key
  channel_id: UCabc
facebook:
  page_id: "1"
  app_id: "2"
  app_secret: secret
  access_token: token
  api_version: v18.0
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.facebook.api_version, "v18.0");
        assert_eq!(config.pipeline.target_language, "en");
        assert_eq!(config.pipeline.audio_path, PathBuf::from("kirtan_audio.mp3"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults_for_missing_sections() {
        let yaml = "pipeline:\n  require_review: true\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert!(config.pipeline.require_review);
        assert_eq!(config.pipeline.target_language, "en");
        assert_eq!(config.youtube.api_key, "YOUR_YOUTUBE_API_KEY");
        assert_eq!(config.facebook.api_version, "v19.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_keeps_defaults_for_missing_fields() {
        let yaml = r#"
facebook:
  page_id: "4242"
"#;
        let mut config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.facebook.page_id, "4242");
        assert_eq!(config.facebook.api_version, "v19.0");
        assert!(is_placeholder(&config.facebook.access_token));

        let vars = env(&[
            ("YOUTUBE_API_KEY", "yt-key"),
            ("YOUTUBE_CHANNEL_ID", "UC123"),
            ("FACEBOOK_ACCESS_TOKEN", "EAAB"),
        ]);
        config.apply_env_with(|key| vars.get(key).cloned());
        assert!(config.ensure_credentials().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_all_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.youtube.channel_id, "YOUR_YOUTUBE_CHANNEL_ID");
        assert!(!config.pipeline.synthesize_audio);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.pipeline.target_language = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.facebook.api_version = "19.0".into();
        assert!(config.validate().is_err());
    }
}
