use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::utils::build_url;
use crate::{PipelineError, Result};

/// Translated text and the source language the service detected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub text: String,
    pub source_language: Option<String>,
}

/// Machine translation of a whole text in one request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, dest_language: &str) -> Result<Translation>;
}

/// Client for the public Google Translate web endpoint
pub struct GoogleTranslateClient {
    client: Client,
}

impl GoogleTranslateClient {
    const TRANSLATE_URL: &'static str = "https://translate.googleapis.com/translate_a/single";

    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Endpoint with auto-detected source and `dest_language` as target
    pub fn translate_url(dest_language: &str) -> Result<Url> {
        build_url(
            Self::TRANSLATE_URL,
            &[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", dest_language),
                ("dt", "t"),
            ],
        )
    }
}

impl Default for GoogleTranslateClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(&self, text: &str, dest_language: &str) -> Result<Translation> {
        let url = Self::translate_url(dest_language)?;

        tracing::debug!(chars = text.chars().count(), dest_language, "Requesting translation");

        // text goes in the body; long transcripts overflow a query string
        let response = self
            .client
            .post(url)
            .form(&[("q", text)])
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to reach translation service"))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                service: "Google Translate",
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse translation response")?;

        parse_translation(&body)
    }
}

/// Read the `[[["translated", "original", ...], ...], null, "src", ...]` layout
pub fn parse_translation(body: &Value) -> Result<Translation> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::InvalidResponse {
            service: "Google Translate",
            detail: "missing sentence list".into(),
        })?;

    let text: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(PipelineError::EmptyTranslation.into());
    }

    let source_language = body.get(2).and_then(Value::as_str).map(str::to_string);

    Ok(Translation {
        text,
        source_language,
    })
}
