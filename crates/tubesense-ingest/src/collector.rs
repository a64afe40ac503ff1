//! Paginated comment collection.
//!
//! Pages through a video's top-level threads in chronological order and, for
//! each thread, pages through its replies before moving on. Stops when the
//! target is reached, the API runs out of pages, the page ceiling or quota
//! budget is hit, or a non-retriable error occurs.

use std::collections::HashSet;

use tracing::{debug, info, warn};
use tubesense_core::{Comment, VideoId, VideoInfo};

use crate::client::RemoteClient;
use crate::error::CollectError;
use crate::quota::QuotaMeter;
use crate::target::CollectionTarget;
use crate::transport::Transport;
use crate::wire::{self, Page};

/// What to do with comments already gathered when a call fails for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Discard everything and return the error.
    #[default]
    FailFast,
    /// Keep what was gathered and report the error in [`StopReason::Partial`].
    ReturnPartial,
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// `maxResults` for both thread and reply pages (API maximum is 100).
    pub page_size: u32,
    /// Ceiling on top-level thread pages per run.
    pub max_pages: usize,
    /// Quota units a run may spend on list calls. `None` is unlimited.
    pub quota_budget: Option<u64>,
    pub failure_policy: FailurePolicy,
    /// Log progress every this many thread pages.
    pub progress_every: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 200,
            quota_budget: None,
            failure_policy: FailurePolicy::FailFast,
            progress_every: 10,
        }
    }
}

/// Parameters of one collection run.
#[derive(Debug, Clone)]
pub struct CollectRequest<'a> {
    pub video_id: &'a VideoId,
    pub api_key: &'a str,
    /// Share of the reported total to gather, in (0, 1].
    pub percentage: f64,
    pub hard_cap: Option<usize>,
    pub include_replies: bool,
}

/// Why a run stopped.
#[derive(Debug)]
pub enum StopReason {
    /// The API reported no further pages.
    Exhausted,
    TargetReached,
    /// The page ceiling ended the run early.
    PageLimit,
    /// The quota budget ended the run early.
    QuotaBudget,
    /// A non-retriable error ended the run; comments gathered so far are kept.
    Partial(CollectError),
}

impl StopReason {
    /// Whether the comments cover less than the run intended.
    pub fn is_partial(&self) -> bool {
        !matches!(self, Self::Exhausted | Self::TargetReached)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Exhausted => "no more pages".into(),
            Self::TargetReached => "target reached".into(),
            Self::PageLimit => "page limit reached".into(),
            Self::QuotaBudget => "quota budget exhausted".into(),
            Self::Partial(err) => format!("stopped on error: {err}"),
        }
    }
}

/// Result of a collection run.
#[derive(Debug)]
pub struct Collection {
    pub video: VideoInfo,
    /// Top-level comment count reported by the platform.
    pub total_available: u64,
    pub target: CollectionTarget,
    /// Comments in upstream order, each thread followed by its replies.
    pub comments: Vec<Comment>,
    pub stop_reason: StopReason,
    pub pages_fetched: usize,
    pub quota_units_used: u64,
}

/// Mutable state of one run.
struct Run {
    comments: Vec<Comment>,
    seen: HashSet<String>,
    target: CollectionTarget,
    pages: usize,
    quota: QuotaMeter,
    skipped: usize,
}

impl Run {
    fn reached(&self) -> bool {
        self.target.is_reached(self.comments.len())
    }

    /// Returns false when the id was already collected.
    fn push(&mut self, comment: Comment) -> bool {
        if !self.seen.insert(comment.comment_id.clone()) {
            debug!(comment_id = %comment.comment_id, "skipping duplicate comment");
            return false;
        }
        self.comments.push(comment);
        true
    }
}

/// Orchestrates thread and reply pagination over a [`RemoteClient`].
pub struct CommentCollector<T> {
    client: RemoteClient<T>,
    config: CollectorConfig,
}

impl<T: Transport> CommentCollector<T> {
    pub fn new(client: RemoteClient<T>, config: CollectorConfig) -> Self {
        Self { client, config }
    }

    /// Fetch title, channel, and statistics for a video.
    ///
    /// An unknown video yields placeholder metadata with a zero comment count.
    pub async fn fetch_video_info(
        &self,
        video_id: &VideoId,
        api_key: &str,
    ) -> Result<VideoInfo, CollectError> {
        let api_key = require_key(api_key)?;
        let params = [
            ("part", "snippet,statistics".to_string()),
            ("id", video_id.to_string()),
            ("key", api_key.to_string()),
        ];
        let value = self.client.fetch("videos", &params).await?;
        match wire::parse_video(video_id, value)? {
            Some(info) => Ok(info),
            None => {
                warn!(video_id = %video_id, "no video found");
                Ok(VideoInfo::not_found(video_id.clone()))
            }
        }
    }

    /// Collect comments for a video.
    ///
    /// A missing API key fails before any network call. With
    /// [`FailurePolicy::FailFast`], a non-retriable error mid-run discards
    /// everything gathered so far.
    pub async fn collect(&self, req: &CollectRequest<'_>) -> Result<Collection, CollectError> {
        let req = &CollectRequest {
            api_key: require_key(req.api_key)?,
            ..req.clone()
        };
        if !(req.percentage > 0.0 && req.percentage <= 1.0) {
            return Err(CollectError::InvalidPercentage(req.percentage));
        }

        let mut quota = QuotaMeter::new(self.config.quota_budget);
        let video = self.fetch_video_info(req.video_id, req.api_key).await?;
        quota.charge_call();

        let total = video.comment_count;
        let target = CollectionTarget::compute(total, req.percentage, req.hard_cap);
        let mut run = Run {
            comments: Vec::new(),
            seen: HashSet::new(),
            target,
            pages: 0,
            quota,
            skipped: 0,
        };

        if total == 0 {
            warn!(video_id = %req.video_id, "no comments found for video");
            return Ok(finish(video, run, StopReason::Exhausted));
        }

        info!(
            video_id = %req.video_id,
            total,
            target = %target,
            percentage = req.percentage,
            include_replies = req.include_replies,
            "collecting comments"
        );

        let stop_reason = match self.paginate_threads(req, &mut run).await {
            Ok(reason) => reason,
            Err(err) => match self.config.failure_policy {
                FailurePolicy::FailFast => {
                    warn!(
                        video_id = %req.video_id,
                        discarded = run.comments.len(),
                        error = %err,
                        "collection failed"
                    );
                    return Err(err);
                }
                FailurePolicy::ReturnPartial => {
                    warn!(
                        video_id = %req.video_id,
                        kept = run.comments.len(),
                        error = %err,
                        "collection failed, returning partial results"
                    );
                    StopReason::Partial(err)
                }
            },
        };

        let collection = finish(video, run, stop_reason);
        let share_pct = collection.comments.len() as f64 / total as f64 * 100.0;
        info!(
            count = collection.comments.len(),
            pages = collection.pages_fetched,
            quota_units = collection.quota_units_used,
            share_pct = (share_pct * 10.0).round() / 10.0,
            reason = %collection.stop_reason.describe(),
            "collection finished"
        );
        Ok(collection)
    }

    async fn paginate_threads(
        &self,
        req: &CollectRequest<'_>,
        run: &mut Run,
    ) -> Result<StopReason, CollectError> {
        let mut page_token: Option<String> = None;

        loop {
            if run.reached() {
                return Ok(StopReason::TargetReached);
            }
            if run.pages >= self.config.max_pages {
                warn!(max_pages = self.config.max_pages, "page limit reached");
                return Ok(StopReason::PageLimit);
            }
            if !run.quota.can_afford_call() {
                warn!(used = run.quota.used(), "quota budget exhausted");
                return Ok(StopReason::QuotaBudget);
            }

            let mut params = vec![
                ("part", "snippet".to_string()),
                ("videoId", req.video_id.to_string()),
                ("key", req.api_key.to_string()),
                ("maxResults", self.config.page_size.to_string()),
                ("order", "time".to_string()),
                ("textFormat", "plainText".to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let value = self.client.fetch("commentThreads", &params).await?;
            run.quota.charge_call();
            run.pages += 1;
            let page = Page::from_value(value)?;

            if self.config.progress_every > 0 && run.pages % self.config.progress_every == 0 {
                info!(
                    pages = run.pages,
                    collected = run.comments.len(),
                    "collection progress"
                );
            }

            for item in page.items.iter().cloned() {
                if run.reached() {
                    return Ok(StopReason::TargetReached);
                }
                let thread = match wire::parse_thread(item) {
                    Ok(thread) => thread,
                    Err(err) => {
                        warn!(error = %err, "skipping malformed comment thread");
                        run.skipped += 1;
                        continue;
                    }
                };

                let parent_id = thread.comment.comment_id.clone();
                let inserted = run.push(thread.comment);

                if inserted && req.include_replies && thread.reply_count > 0 && !run.reached() {
                    if let Some(reason) = self.paginate_replies(req, &parent_id, run).await? {
                        return Ok(reason);
                    }
                }
            }

            match page.next_token() {
                Some(token) => page_token = Some(token.to_string()),
                None => {
                    info!("reached end of comments");
                    return Ok(StopReason::Exhausted);
                }
            }
        }
    }

    /// Page through one thread's replies. Returns a stop reason only when the
    /// whole run has to end.
    async fn paginate_replies(
        &self,
        req: &CollectRequest<'_>,
        parent_id: &str,
        run: &mut Run,
    ) -> Result<Option<StopReason>, CollectError> {
        let mut page_token: Option<String> = None;

        loop {
            if run.reached() {
                return Ok(None);
            }
            if !run.quota.can_afford_call() {
                warn!(used = run.quota.used(), "quota budget exhausted");
                return Ok(Some(StopReason::QuotaBudget));
            }

            let mut params = vec![
                ("part", "snippet".to_string()),
                ("parentId", parent_id.to_string()),
                ("key", req.api_key.to_string()),
                ("maxResults", self.config.page_size.to_string()),
                ("textFormat", "plainText".to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let value = self.client.fetch("comments", &params).await?;
            run.quota.charge_call();
            let page = Page::from_value(value)?;

            for item in page.items.iter().cloned() {
                if run.reached() {
                    return Ok(None);
                }
                match wire::parse_reply(item) {
                    Ok(reply) => {
                        run.push(reply);
                    }
                    Err(err) => {
                        warn!(parent_id, error = %err, "skipping malformed reply");
                        run.skipped += 1;
                    }
                }
            }

            match page.next_token() {
                Some(token) => page_token = Some(token.to_string()),
                None => return Ok(None),
            }
        }
    }
}

fn require_key(api_key: &str) -> Result<&str, CollectError> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(CollectError::QuotaOrAuth("API key not configured".into()));
    }
    Ok(key)
}

fn finish(video: VideoInfo, run: Run, stop_reason: StopReason) -> Collection {
    if run.skipped > 0 {
        warn!(skipped = run.skipped, "malformed records were skipped");
    }
    Collection {
        total_available: video.comment_count,
        video,
        target: run.target,
        comments: run.comments,
        stop_reason,
        pages_fetched: run.pages,
        quota_units_used: run.quota.used(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RetryPolicy;
    use crate::testing::{ScriptedTransport, ok, status};
    use serde_json::{Value, json};
    use std::time::Duration;

    const VIDEO: &str = "dQw4w9WgXcQ";

    fn video_response(comment_count: u64) -> Value {
        json!({
            "items": [{
                "snippet": { "title": "A video", "channelTitle": "A channel" },
                "statistics": { "commentCount": comment_count.to_string() }
            }]
        })
    }

    fn thread(id: &str, replies: u64) -> Value {
        json!({
            "id": format!("t-{id}"),
            "snippet": {
                "topLevelComment": {
                    "id": id,
                    "snippet": {
                        "textDisplay": format!("comment {id}"),
                        "authorDisplayName": "someone",
                        "likeCount": 1,
                        "publishedAt": "2024-01-01T00:00:00Z"
                    }
                },
                "totalReplyCount": replies
            }
        })
    }

    fn reply(id: &str) -> Value {
        json!({ "id": id, "snippet": { "textDisplay": format!("reply {id}") } })
    }

    fn param(query: &[(String, String)], key: &str) -> Option<String> {
        query.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    fn collector(transport: ScriptedTransport, config: CollectorConfig) -> CommentCollector<ScriptedTransport> {
        let client = RemoteClient::new(transport).with_retry(RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
        });
        CommentCollector::new(client, config)
    }

    fn request(id: &VideoId) -> CollectRequest<'_> {
        CollectRequest {
            video_id: id,
            api_key: "test-key",
            percentage: 1.0,
            hard_cap: None,
            include_replies: true,
        }
    }

    fn ids(c: &Collection) -> Vec<&str> {
        c.comments.iter().map(|c| c.comment_id.as_str()).collect()
    }

    #[tokio::test]
    async fn two_pages_collected_in_order() {
        let transport = ScriptedTransport::routed(|url, query| {
            if url.ends_with("/videos") {
                return ok(video_response(4));
            }
            match param(query, "pageToken").as_deref() {
                None => ok(json!({ "items": [thread("a", 0), thread("b", 0)], "nextPageToken": "p2" })),
                Some("p2") => ok(json!({ "items": [thread("c", 0), thread("d", 0)] })),
                Some(other) => panic!("unexpected token {other}"),
            }
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        assert_eq!(ids(&result), vec!["a", "b", "c", "d"]);
        assert!(matches!(result.stop_reason, StopReason::Exhausted));
        assert_eq!(result.pages_fetched, 2);
        assert_eq!(result.quota_units_used, 3);
        assert_eq!(result.target, CollectionTarget::Unbounded);
    }

    #[tokio::test]
    async fn replies_follow_their_thread() {
        let transport = ScriptedTransport::routed(|url, query| {
            if url.ends_with("/videos") {
                return ok(video_response(2));
            }
            if url.ends_with("/comments") {
                return match (
                    param(query, "parentId").as_deref(),
                    param(query, "pageToken").as_deref(),
                ) {
                    (Some("a"), None) => ok(json!({ "items": [reply("a.1")], "nextPageToken": "r2" })),
                    (Some("a"), Some("r2")) => ok(json!({ "items": [reply("a.2")] })),
                    other => panic!("unexpected reply request {other:?}"),
                };
            }
            ok(json!({ "items": [thread("a", 2), thread("b", 0)] }))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        assert_eq!(ids(&result), vec!["a", "a.1", "a.2", "b"]);
        let flags: Vec<bool> = result.comments.iter().map(|c| c.is_reply).collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[tokio::test]
    async fn replies_skipped_when_disabled() {
        let transport = ScriptedTransport::routed(|url, _| {
            if url.ends_with("/videos") {
                return ok(video_response(1));
            }
            assert!(!url.ends_with("/comments"), "reply endpoint must not be called");
            ok(json!({ "items": [thread("a", 5)] }))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();
        let mut req = request(&id);
        req.include_replies = false;

        let result = c.collect(&req).await.unwrap();
        assert_eq!(ids(&result), vec!["a"]);
    }

    #[tokio::test]
    async fn stops_at_target_mid_page() {
        let transport = ScriptedTransport::routed(|url, _| {
            if url.ends_with("/videos") {
                return ok(video_response(10));
            }
            ok(json!({
                "items": (0..10).map(|i| thread(&i.to_string(), 0)).collect::<Vec<_>>(),
                "nextPageToken": "more"
            }))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();
        let mut req = request(&id);
        req.percentage = 0.5;

        let result = c.collect(&req).await.unwrap();
        assert_eq!(result.comments.len(), 5);
        assert_eq!(result.target, CollectionTarget::Limit(5));
        assert!(matches!(result.stop_reason, StopReason::TargetReached));
        assert_eq!(result.pages_fetched, 1);
    }

    #[tokio::test]
    async fn replies_count_toward_target() {
        let transport = ScriptedTransport::routed(|url, _| {
            if url.ends_with("/videos") {
                return ok(video_response(4));
            }
            if url.ends_with("/comments") {
                return ok(json!({ "items": [reply("r1"), reply("r2"), reply("r3")] }));
            }
            ok(json!({ "items": [thread("a", 3), thread("b", 0)] }))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();
        let mut req = request(&id);
        req.hard_cap = Some(3);

        let result = c.collect(&req).await.unwrap();
        assert_eq!(ids(&result), vec!["a", "r1", "r2"]);
    }

    #[tokio::test]
    async fn zero_comments_returns_empty_without_paging() {
        let transport = ScriptedTransport::routed(|url, _| {
            assert!(url.ends_with("/videos"), "only the metadata call is expected");
            ok(video_response(0))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        assert!(result.comments.is_empty());
        assert_eq!(result.pages_fetched, 0);
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let transport = ScriptedTransport::routed(|_, _| panic!("no request expected"));
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();
        let mut req = request(&id);
        req.api_key = "  ";

        let err = c.collect(&req).await.unwrap_err();
        assert!(matches!(err, CollectError::QuotaOrAuth(_)));
    }

    #[tokio::test]
    async fn padded_key_is_trimmed_for_every_call() {
        let transport = ScriptedTransport::routed(|url, _| {
            if url.ends_with("/videos") {
                return ok(video_response(2));
            }
            if url.ends_with("/comments") {
                return ok(json!({ "items": [reply("a.1")] }));
            }
            ok(json!({ "items": [thread("a", 1)] }))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();
        let mut req = request(&id);
        req.api_key = "  test-key \n";

        c.collect(&req).await.unwrap();

        let requests = c.client_requests();
        assert_eq!(requests.len(), 3);
        for r in &requests {
            assert_eq!(r.param("key"), Some("test-key"), "untrimmed key sent to {}", r.url);
        }
    }

    #[tokio::test]
    async fn malformed_threads_are_skipped() {
        let transport = ScriptedTransport::routed(|url, _| {
            if url.ends_with("/videos") {
                return ok(video_response(3));
            }
            ok(json!({ "items": [thread("a", 0), { "id": "broken" }, thread("c", 0)] }))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        assert_eq!(ids(&result), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn duplicate_ids_across_pages_are_dropped() {
        let transport = ScriptedTransport::routed(|url, query| {
            if url.ends_with("/videos") {
                return ok(video_response(10));
            }
            if url.ends_with("/comments") {
                return ok(json!({ "items": [reply("a.1")] }));
            }
            match param(query, "pageToken").as_deref() {
                None => ok(json!({ "items": [thread("a", 1), thread("b", 0)], "nextPageToken": "p2" })),
                _ => ok(json!({ "items": [thread("a", 1), thread("c", 0)] })),
            }
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        assert_eq!(ids(&result), vec!["a", "a.1", "b", "c"]);

        // The repeated thread must not page its replies again.
        let reply_calls = c
            .client_requests()
            .iter()
            .filter(|r| r.url.ends_with("/comments"))
            .count();
        assert_eq!(reply_calls, 1);
        assert_eq!(result.quota_units_used, 4);
    }

    #[tokio::test]
    async fn page_limit_ends_run_without_error() {
        let transport = ScriptedTransport::routed(|url, query| {
            if url.ends_with("/videos") {
                return ok(video_response(1000));
            }
            let n: usize = param(query, "pageToken").map_or(0, |t| t.parse().unwrap());
            ok(json!({ "items": [thread(&n.to_string(), 0)], "nextPageToken": (n + 1).to_string() }))
        });
        let config = CollectorConfig {
            max_pages: 3,
            ..Default::default()
        };
        let c = collector(transport, config);
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        assert_eq!(ids(&result), vec!["0", "1", "2"]);
        assert!(matches!(result.stop_reason, StopReason::PageLimit));
        assert!(result.stop_reason.is_partial());
    }

    #[tokio::test]
    async fn quota_budget_ends_run_without_error() {
        let transport = ScriptedTransport::routed(|url, query| {
            if url.ends_with("/videos") {
                return ok(video_response(1000));
            }
            let n: usize = param(query, "pageToken").map_or(0, |t| t.parse().unwrap());
            ok(json!({ "items": [thread(&n.to_string(), 0)], "nextPageToken": (n + 1).to_string() }))
        });
        let config = CollectorConfig {
            quota_budget: Some(3),
            ..Default::default()
        };
        let c = collector(transport, config);
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        // One unit for metadata, two for thread pages.
        assert_eq!(result.comments.len(), 2);
        assert_eq!(result.quota_units_used, 3);
        assert!(matches!(result.stop_reason, StopReason::QuotaBudget));
    }

    #[tokio::test]
    async fn malformed_replies_are_skipped() {
        let transport = ScriptedTransport::routed(|url, _| {
            if url.ends_with("/videos") {
                return ok(video_response(5));
            }
            if url.ends_with("/comments") {
                return ok(json!({ "items": [reply("r1"), { "snippet": {} }, reply("r3")] }));
            }
            ok(json!({ "items": [thread("a", 3), thread("b", 0)] }))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        assert_eq!(ids(&result), vec!["a", "r1", "r3", "b"]);
        assert!(matches!(result.stop_reason, StopReason::Exhausted));
    }

    #[tokio::test]
    async fn quota_budget_ends_run_between_reply_pages() {
        let transport = ScriptedTransport::routed(|url, query| {
            if url.ends_with("/videos") {
                return ok(video_response(100));
            }
            if url.ends_with("/comments") {
                let n: usize = param(query, "pageToken").map_or(0, |t| t.parse().unwrap());
                return ok(json!({ "items": [reply(&format!("r{n}"))], "nextPageToken": (n + 1).to_string() }));
            }
            ok(json!({ "items": [thread("a", 50), thread("b", 0)] }))
        });
        let config = CollectorConfig {
            quota_budget: Some(3),
            ..Default::default()
        };
        let c = collector(transport, config);
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        // Metadata, one thread page, one reply page.
        assert_eq!(ids(&result), vec!["a", "r0"]);
        assert_eq!(result.quota_units_used, 3);
        assert!(matches!(result.stop_reason, StopReason::QuotaBudget));
        assert!(result.stop_reason.is_partial());
    }

    fn failing_second_page() -> ScriptedTransport {
        ScriptedTransport::routed(|url, query| {
            if url.ends_with("/videos") {
                return ok(video_response(10));
            }
            match param(query, "pageToken").as_deref() {
                None => ok(json!({ "items": [thread("a", 0)], "nextPageToken": "p2" })),
                _ => status(404),
            }
        })
    }

    #[tokio::test]
    async fn fail_fast_discards_partial_results() {
        let c = collector(failing_second_page(), CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();

        let err = c.collect(&request(&id)).await.unwrap_err();
        match err {
            CollectError::Remote(e) => assert_eq!(e.status, Some(404)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn return_partial_keeps_gathered_comments() {
        let config = CollectorConfig {
            failure_policy: FailurePolicy::ReturnPartial,
            ..Default::default()
        };
        let c = collector(failing_second_page(), config);
        let id = VideoId::extract(VIDEO).unwrap();

        let result = c.collect(&request(&id)).await.unwrap();
        assert_eq!(ids(&result), vec!["a"]);
        assert!(matches!(result.stop_reason, StopReason::Partial(CollectError::Remote(_))));
    }

    #[tokio::test]
    async fn thread_requests_carry_paging_params() {
        let transport = ScriptedTransport::routed(|url, _| {
            if url.ends_with("/videos") {
                return ok(video_response(1));
            }
            ok(json!({ "items": [thread("a", 0)] }))
        });
        let c = collector(transport, CollectorConfig::default());
        let id = VideoId::extract(VIDEO).unwrap();
        c.collect(&request(&id)).await.unwrap();

        let requests = c.client_requests();
        let threads = requests
            .iter()
            .find(|r| r.url.ends_with("/commentThreads"))
            .unwrap();
        assert_eq!(threads.param("videoId"), Some(VIDEO));
        assert_eq!(threads.param("maxResults"), Some("100"));
        assert_eq!(threads.param("order"), Some("time"));
        assert_eq!(threads.param("key"), Some("test-key"));
        assert_eq!(threads.param("pageToken"), None);
    }

    impl CommentCollector<ScriptedTransport> {
        fn client_requests(&self) -> Vec<crate::testing::Recorded> {
            self.client.transport().requests()
        }
    }
}
