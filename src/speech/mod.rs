use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};

use crate::utils::build_url;
use crate::{PipelineError, Result};

/// Turns text into a speech audio file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Write speech for `text` to `output` and return the written path
    async fn synthesize(&self, text: &str, language: &str, output: &Path) -> Result<PathBuf>;
}

/// Google Translate text-to-speech, MP3 output
pub struct GoogleTtsClient {
    client: Client,
}

impl GoogleTtsClient {
    const TTS_URL: &'static str = "https://translate.google.com/translate_tts";

    /// The endpoint rejects longer inputs
    pub const MAX_CHUNK_CHARS: usize = 100;

    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn fetch_chunk(&self, chunk: &str, language: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();

        let url = build_url(
            Self::TTS_URL,
            &[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ],
        )?;

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                service: "Google TTS",
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for GoogleTtsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, text: &str, language: &str, output: &Path) -> Result<PathBuf> {
        let chunks = split_for_tts(text, Self::MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            anyhow::bail!("Nothing to synthesize");
        }

        tracing::info!(chunks = chunks.len(), "Synthesizing speech");

        // MP3 frames concatenate into one playable stream
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, language, idx, chunks.len()).await?;
            audio.extend_from_slice(&bytes);
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(output, audio).context("Failed to write audio file")?;

        Ok(output.to_path_buf())
    }
}

/// Split text into chunks of at most `max_chars` characters on whitespace.
/// Words longer than `max_chars` are cut.
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            chunks.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_for_tts("Hello   world", 100), vec!["Hello world"]);
        assert!(split_for_tts("   ", 100).is_empty());
    }

    #[test]
    fn test_chunks_break_on_whitespace() {
        let chunks = split_for_tts("one two three four", 9);
        assert_eq!(chunks, vec!["one two", "three", "four"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn test_long_word_is_cut() {
        let chunks = split_for_tts("ab abcdefgh cd", 3);
        assert_eq!(chunks, vec!["ab", "abc", "def", "gh", "cd"]);
    }

    #[test]
    fn test_chunk_length_counts_characters() {
        // six Gurmukhi characters, eighteen bytes
        let chunks = split_for_tts("ਸਤਿਨਾਮ ਸਤਿ", 6);
        assert_eq!(chunks, vec!["ਸਤਿਨਾਮ", "ਸਤਿ"]);
    }
}
