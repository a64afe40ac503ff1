//! Typed records for the remote API's JSON, validated at the boundary.
//!
//! Pages are parsed leniently (items stay as raw JSON) so that one bad record
//! can be skipped without losing the rest of the page.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tubesense_core::{Comment, VideoId, VideoInfo};

use crate::error::{MalformedRecord, RemoteError, RemoteErrorKind};

/// One page of any paginated list resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Page {
    pub fn from_value(value: Value) -> Result<Self, RemoteError> {
        serde_json::from_value(value).map_err(|e| {
            RemoteError::new(RemoteErrorKind::Malformed, format!("invalid page: {e}"))
        })
    }

    /// Token for the following page, if there is one.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentRecord {
    id: String,
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    published_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadRecord {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: CommentRecord,
    #[serde(default)]
    total_reply_count: u64,
}

/// A top-level comment plus what we need to fetch its replies.
#[derive(Debug)]
pub(crate) struct ParsedThread {
    pub comment: Comment,
    pub reply_count: u64,
}

impl CommentRecord {
    fn into_comment(self, is_reply: bool, raw: Value) -> Result<Comment, serde_json::Error> {
        if self.id.trim().is_empty() {
            return Err(serde::de::Error::custom("empty comment id"));
        }
        Ok(Comment {
            comment_id: self.id,
            text: self.snippet.text_display,
            author: self.snippet.author_display_name,
            like_count: self.snippet.like_count,
            published_at: self.snippet.published_at,
            is_reply,
            raw_payload: raw,
        })
    }
}

/// Parse a `commentThreads` item. The raw payload keeps the whole thread.
pub(crate) fn parse_thread(item: Value) -> Result<ParsedThread, MalformedRecord> {
    let malformed = |source| MalformedRecord {
        record: "thread",
        source,
    };
    let record: ThreadRecord = serde_json::from_value(item.clone()).map_err(malformed)?;
    let reply_count = record.snippet.total_reply_count;
    let comment = record
        .snippet
        .top_level_comment
        .into_comment(false, item)
        .map_err(malformed)?;
    Ok(ParsedThread {
        comment,
        reply_count,
    })
}

/// Parse a `comments` item returned for a parent thread.
pub(crate) fn parse_reply(item: Value) -> Result<Comment, MalformedRecord> {
    let malformed = |source| MalformedRecord {
        record: "reply",
        source,
    };
    let record: CommentRecord = serde_json::from_value(item.clone()).map_err(malformed)?;
    record.into_comment(true, item).map_err(malformed)
}

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    items: Vec<VideoRecord>,
}

#[derive(Debug, Deserialize)]
struct VideoRecord {
    #[serde(default)]
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: String,
}

/// Statistics arrive as decimal strings; absent counts mean zero.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    #[serde(default, deserialize_with = "count")]
    view_count: u64,
    #[serde(default, deserialize_with = "count")]
    like_count: u64,
    #[serde(default, deserialize_with = "count")]
    comment_count: u64,
}

fn count<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Num(u64),
        Text(String),
    }
    match Count::deserialize(de)? {
        Count::Num(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Parse a `videos` response. `None` when the video is unknown.
pub(crate) fn parse_video(video_id: &VideoId, value: Value) -> Result<Option<VideoInfo>, RemoteError> {
    let list: VideoList = serde_json::from_value(value).map_err(|e| {
        RemoteError::new(RemoteErrorKind::Malformed, format!("invalid video list: {e}"))
    })?;
    Ok(list.items.into_iter().next().map(|v| VideoInfo {
        video_id: video_id.clone(),
        title: v.snippet.title,
        channel_title: v.snippet.channel_title,
        published_at: v.snippet.published_at,
        view_count: v.statistics.view_count,
        like_count: v.statistics.like_count,
        comment_count: v.statistics.comment_count,
    }))
}
