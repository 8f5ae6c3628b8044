use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod graph;

pub use graph::GraphClient;

use crate::Result;

/// A post about to be published on the Page
#[derive(Debug, Clone, PartialEq)]
pub struct PagePost {
    pub message: String,

    /// Upload this video with `message` as its description
    pub video: Option<PathBuf>,
}

impl PagePost {
    /// Message made of the preamble followed by the translation, unchanged
    pub fn new(preamble: &str, translated_text: &str, video: Option<PathBuf>) -> Self {
        Self {
            message: format!("{}{}", preamble, translated_text),
            video,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostKind {
    Feed,
    Video,
}

/// What the Graph API created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub object_id: String,
    pub kind: PostKind,
    pub published_at: DateTime<Utc>,
}

/// Publishes posts to a social platform page
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, post: &PagePost) -> Result<PublishReceipt>;
}

/// The two Graph API writes the publisher needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Create an object on `parent_object`'s `connection_name` edge, returning its id
    async fn put_object(&self, parent_object: &str, connection_name: &str, message: &str) -> Result<String>;

    /// Upload a video to `parent_object`, returning its id
    async fn put_video(
        &self,
        parent_object: &str,
        video_path: &Path,
        description: &str,
        published: bool,
    ) -> Result<String>;
}

/// Posts to a Facebook Page through the Graph API
pub struct FacebookPublisher<G: GraphApi> {
    graph: G,
    page_id: String,
}

impl<G: GraphApi> FacebookPublisher<G> {
    pub fn new(graph: G, page_id: impl Into<String>) -> Self {
        Self {
            graph,
            page_id: page_id.into(),
        }
    }
}

#[async_trait]
impl<G: GraphApi> Publisher for FacebookPublisher<G> {
    async fn publish(&self, post: &PagePost) -> Result<PublishReceipt> {
        let (object_id, kind) = match &post.video {
            Some(video_path) => {
                tracing::info!(page_id = %self.page_id, path = %video_path.display(), "Uploading video");
                let id = self
                    .graph
                    .put_video(&self.page_id, video_path, &post.message, true)
                    .await?;
                println!("Video posted to Facebook.");
                (id, PostKind::Video)
            }
            None => {
                tracing::info!(page_id = %self.page_id, chars = post.message.len(), "Posting to feed");
                let id = self
                    .graph
                    .put_object(&self.page_id, "feed", &post.message)
                    .await?;
                println!("Text message posted to Facebook.");
                (id, PostKind::Feed)
            }
        };

        Ok(PublishReceipt {
            object_id,
            kind,
            published_at: Utc::now(),
        })
    }
}
