//! Comment and video records shared between collection, inference, and reporting.

use serde::{Deserialize, Serialize};

use crate::VideoId;

/// A single comment collected from the remote API.
///
/// Created during pagination and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub text: String,
    pub author: String,
    pub like_count: u64,
    /// ISO 8601 timestamp string, as reported upstream.
    pub published_at: String,
    pub is_reply: bool,
    /// The upstream record this comment was parsed from.
    #[serde(default)]
    pub raw_payload: serde_json::Value,
}

impl Comment {
    /// Whether the comment has text worth classifying.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Video metadata used to size a collection run and label the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video_id: VideoId,
    pub title: String,
    pub channel_title: String,
    pub published_at: String,
    pub view_count: u64,
    pub like_count: u64,
    /// Total top-level comment count reported by the platform.
    pub comment_count: u64,
}

impl VideoInfo {
    /// Placeholder metadata for a video the API does not know about.
    pub fn not_found(video_id: VideoId) -> Self {
        Self {
            video_id,
            title: "Video Not Found".into(),
            channel_title: "Unknown Channel".into(),
            published_at: String::new(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
        }
    }
}
