//! Sequential pagination streams
//!
//! One stream is one sequential pagination session over one resource for
//! one parent key (keyword, item id, creator id). Pages within a stream are
//! causally dependent (page *i+1* needs page *i*'s cursor), so a stream
//! never overlaps its own fetches and pauses between them. A page failure
//! terminates its stream without advancing the cursor; everything collected
//! before the failure is still reported.
//!
//! An empty page terminates a stream even when the server still claims
//! `has_more`. The upstream behavior of retrying such pages in place can
//! spin forever against a service that keeps answering with empty pages.

use crate::client::{ApiClient, SEARCH_PAGE_SIZE};
use crate::config::{HarvestConfig, PublishWindow, SortOrder};
use crate::crawler::pacing::RateLimitPolicy;
use crate::model::{Comment, ContentItem, ItemRef, ReplyExpansion};
use crate::sink::Sink;
use crate::HarvestError;
use std::future::Future;
use std::sync::Arc;

/// What a stream produced, plus the error that terminated it early (if any)
#[derive(Debug)]
pub struct StreamOutcome<T> {
    /// Everything collected before the stream ended
    pub items: Vec<T>,

    /// The page failure that aborted the stream, `None` on normal exhaustion
    pub error: Option<HarvestError>,
}

impl<T> StreamOutcome<T> {
    fn complete(items: Vec<T>) -> Self {
        Self { items, error: None }
    }

    fn aborted(items: Vec<T>, error: HarvestError) -> Self {
        Self {
            items,
            error: Some(error),
        }
    }
}

/// Keyword search stream: numeric offsets, server-issued search session id
pub struct SearchStream {
    client: Arc<ApiClient>,
    pacing: RateLimitPolicy,
    keyword: String,
    start_page: u32,
    max_items: u32,
    sort_order: SortOrder,
    publish_window: PublishWindow,
}

impl SearchStream {
    pub fn new(
        client: Arc<ApiClient>,
        pacing: RateLimitPolicy,
        keyword: String,
        config: &HarvestConfig,
    ) -> Self {
        Self {
            client,
            pacing,
            keyword,
            start_page: config.start_page,
            max_items: config.max_items_per_keyword,
            sort_order: config.sort_order,
            publish_window: config.publish_window,
        }
    }

    /// Drains the stream, invoking `on_page` with each non-empty page
    ///
    /// The item budget is counted from the start page, so a non-zero start
    /// page still gets the full budget. Stops when the count of items
    /// fetched so far reaches the ceiling, on an empty page, or on a page
    /// failure. The search id returned by each page is echoed on the next
    /// request of this stream only.
    pub async fn drain<F, Fut>(self, mut on_page: F) -> StreamOutcome<ContentItem>
    where
        F: FnMut(Vec<ContentItem>) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut collected = Vec::new();
        let mut search_id = String::new();
        let mut page = self.start_page;
        let mut first = true;

        loop {
            if (page - self.start_page) * SEARCH_PAGE_SIZE >= self.max_items {
                break;
            }
            let offset = page * SEARCH_PAGE_SIZE;
            if !first {
                self.pacing.pause().await;
            }
            first = false;

            tracing::info!(keyword = %self.keyword, page, offset, "fetching search page");
            let result = self
                .client
                .search_page(
                    &self.keyword,
                    offset,
                    &search_id,
                    self.sort_order,
                    self.publish_window,
                )
                .await;

            let page_data = match result {
                Ok(page_data) => page_data,
                Err(e) => {
                    tracing::error!(
                        keyword = %self.keyword,
                        offset,
                        error = %e,
                        "search stream aborted"
                    );
                    return StreamOutcome::aborted(collected, e);
                }
            };

            if !page_data.search_id.is_empty() {
                search_id = page_data.search_id;
            }

            if page_data.items.is_empty() {
                tracing::info!(keyword = %self.keyword, offset, "empty search page, stream done");
                break;
            }

            on_page(page_data.items.clone()).await;
            collected.extend(page_data.items);
            page += 1;
        }

        StreamOutcome::complete(collected)
    }
}

/// Creator post stream: opaque `max_cursor` plus `has_more`
pub struct CreatorPostStream {
    client: Arc<ApiClient>,
    pacing: RateLimitPolicy,
    creator_id: String,
}

impl CreatorPostStream {
    pub fn new(client: Arc<ApiClient>, pacing: RateLimitPolicy, creator_id: String) -> Self {
        Self {
            client,
            pacing,
            creator_id,
        }
    }

    /// Drains the stream, invoking `on_page` with each non-empty page
    pub async fn drain<F, Fut>(self, mut on_page: F) -> StreamOutcome<ContentItem>
    where
        F: FnMut(Vec<ContentItem>) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut collected = Vec::new();
        let mut max_cursor = String::new();
        let mut first = true;

        loop {
            if !first {
                self.pacing.pause().await;
            }
            first = false;

            let result = self
                .client
                .creator_posts_page(&self.creator_id, &max_cursor)
                .await;

            let page = match result {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        creator = %self.creator_id,
                        cursor = %max_cursor,
                        error = %e,
                        "creator post stream aborted"
                    );
                    return StreamOutcome::aborted(collected, e);
                }
            };

            max_cursor = page.max_cursor;
            tracing::info!(
                creator = %self.creator_id,
                posts = page.items.len(),
                "fetched creator post page"
            );

            if page.items.is_empty() {
                break;
            }

            on_page(page.items.clone()).await;
            collected.extend(page.items);

            if !page.has_more {
                break;
            }
        }

        StreamOutcome::complete(collected)
    }
}

/// Comment harvest for one item: top-level comment stream plus the reply
/// streams it spawns, all drawing from one shared per-item budget
///
/// Clone-cheap; the coordinator hands one clone to each pool task.
#[derive(Clone)]
pub struct CommentHarvest {
    client: Arc<ApiClient>,
    pacing: RateLimitPolicy,
    sink: Arc<dyn Sink>,
    cap: usize,
    fetch_replies: bool,
}

impl CommentHarvest {
    pub fn new(
        client: Arc<ApiClient>,
        pacing: RateLimitPolicy,
        sink: Arc<dyn Sink>,
        cap: u32,
        fetch_replies: bool,
    ) -> Self {
        Self {
            client,
            pacing,
            sink,
            cap: cap as usize,
            fetch_replies,
        }
    }

    /// Drains the comment stream for one item up to the cap
    ///
    /// Every page, top-level or reply, is forwarded to the sink as it
    /// arrives and followed by a pacing delay before the next fetch of this
    /// harvest. The final page is truncated to the remaining budget so the
    /// total never exceeds the cap.
    pub async fn drain(&self, item_id: ItemRef) -> StreamOutcome<Comment> {
        let mut collected: Vec<Comment> = Vec::new();
        let mut cursor = "0".to_string();
        let mut first = true;

        loop {
            if collected.len() >= self.cap {
                break;
            }
            if !first {
                self.pacing.pause().await;
            }
            first = false;

            let page = match self.client.comment_page(&item_id, &cursor).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        item = %item_id,
                        cursor = %cursor,
                        error = %e,
                        "comment stream aborted"
                    );
                    return StreamOutcome::aborted(collected, e);
                }
            };

            // The cursor only ever advances past successfully fetched pages.
            cursor = page.cursor;
            let has_more = page.has_more;

            if page.comments.is_empty() {
                break;
            }

            let budget = self.cap - collected.len();
            let mut batch = page.comments;
            batch.truncate(budget);

            self.sink.on_comments(&item_id, &batch).await;
            tracing::debug!(item = %item_id, forwarded = batch.len(), "comment page forwarded");

            if self.fetch_replies {
                for comment in &batch {
                    let remaining = self.cap.saturating_sub(collected.len() + batch.len());
                    if remaining == 0 {
                        break;
                    }
                    if let ReplyExpansion::Replies(count) = comment.expansion() {
                        tracing::debug!(
                            item = %item_id,
                            comment = %comment.id,
                            advertised = count,
                            "expanding replies"
                        );
                        let replies = self
                            .drain_replies(&item_id, &comment.id, remaining)
                            .await;
                        collected.extend(replies.items);
                        // A reply-stream failure ends only that reply
                        // stream; the top-level stream carries on.
                    }
                }
            }

            collected.extend(batch);

            if !has_more {
                break;
            }
        }

        StreamOutcome::complete(collected)
    }

    /// Drains one comment's reply stream within the remaining budget
    async fn drain_replies(
        &self,
        item_id: &ItemRef,
        comment_id: &str,
        budget: usize,
    ) -> StreamOutcome<Comment> {
        let mut collected: Vec<Comment> = Vec::new();
        let mut cursor = "0".to_string();

        loop {
            if collected.len() >= budget {
                break;
            }
            // A comment page fetch always precedes the first reply page, so
            // every reply fetch is paced.
            self.pacing.pause().await;

            let page = match self.client.reply_page(comment_id, &cursor).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        item = %item_id,
                        comment = %comment_id,
                        cursor = %cursor,
                        error = %e,
                        "reply stream aborted"
                    );
                    return StreamOutcome::aborted(collected, e);
                }
            };

            cursor = page.cursor;
            let has_more = page.has_more;

            if page.comments.is_empty() {
                break;
            }

            let mut batch = page.comments;
            batch.truncate(budget - collected.len());

            self.sink.on_comments(item_id, &batch).await;
            collected.extend(batch);

            if !has_more {
                break;
            }
        }

        StreamOutcome::complete(collected)
    }
}
