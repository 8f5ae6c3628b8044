use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::path::Path;

use super::GraphApi;
use crate::utils::{check_file_accessible, video_mime_type};
use crate::{PipelineError, Result};

/// Minimal Facebook Graph API client authenticated with a Page access token
pub struct GraphClient {
    client: Client,
    access_token: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<i64>,
}

impl GraphClient {
    const GRAPH_URL: &'static str = "https://graph.facebook.com";
    const GRAPH_VIDEO_URL: &'static str = "https://graph-video.facebook.com";

    pub fn new(access_token: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            api_version: api_version.into(),
        }
    }

    fn endpoint(&self, base: &str, parent_object: &str, connection_name: &str) -> String {
        format!("{}/{}/{}/{}", base, self.api_version, parent_object, connection_name)
    }

    /// Form body of a feed post
    fn feed_fields<'a>(&'a self, message: &'a str) -> [(&'static str, &'a str); 2] {
        [("message", message), ("access_token", self.access_token.as_str())]
    }

    /// Text fields sent alongside the `source` part of a video upload
    fn video_fields(&self, description: &str, published: bool) -> Vec<(&'static str, String)> {
        vec![
            ("access_token", self.access_token.clone()),
            ("description", description.to_string()),
            ("published", published.to_string()),
        ]
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn put_object(&self, parent_object: &str, connection_name: &str, message: &str) -> Result<String> {
        let url = self.endpoint(Self::GRAPH_URL, parent_object, connection_name);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .form(&self.feed_fields(message))
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to reach Graph API"))?;

        created_object_id(response).await
    }

    async fn put_video(
        &self,
        parent_object: &str,
        video_path: &Path,
        description: &str,
        published: bool,
    ) -> Result<String> {
        check_file_accessible(video_path)?;

        let url = self.endpoint(Self::GRAPH_VIDEO_URL, parent_object, "videos");
        tracing::debug!("POST {}", url);

        let bytes = tokio::fs::read(video_path)
            .await
            .context("Failed to read video file")?;
        let file_name = video_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        let source = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(video_mime_type(video_path))?;

        let form = self
            .video_fields(description, published)
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .part("source", source);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to upload video"))?;

        created_object_id(response).await
    }
}

async fn created_object_id(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(graph_error(status.as_u16(), &body).into());
    }

    let created: CreatedObject =
        serde_json::from_str(&body).map_err(|e| PipelineError::InvalidResponse {
            service: "Facebook Graph",
            detail: e.to_string(),
        })?;

    Ok(created.id)
}

fn graph_error(status: u16, body: &str) -> PipelineError {
    let message = match serde_json::from_str::<GraphErrorEnvelope>(body) {
        Ok(GraphErrorEnvelope { error }) => match (error.kind, error.code) {
            (Some(kind), Some(code)) => format!("{} (#{} {})", error.message, code, kind),
            _ => error.message,
        },
        Err(_) => body.to_string(),
    };

    PipelineError::Api {
        service: "Facebook Graph",
        status,
        message,
    }
}
