//! Result delivery
//!
//! The core forwards harvested items and comments to a [`Sink`] as soon as
//! each page arrives and never assumes synchronous completion; persistence
//! failures are the collaborator's concern. [`MemorySink`] is an in-process
//! implementation used in tests and by callers that post-process in memory.

use crate::model::{Comment, ContentItem, ItemRef};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Receives harvested results, fire-and-forget from the core's perspective
#[async_trait]
pub trait Sink: Send + Sync {
    /// Called with each batch of content items (search page, detail fetches,
    /// creator posts, creator profiles)
    async fn on_items(&self, items: &[ContentItem]);

    /// Called with each page of comments or replies for one item
    async fn on_comments(&self, item_id: &ItemRef, comments: &[Comment]);
}

/// Collects everything in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    items: Mutex<Vec<ContentItem>>,
    comments: Mutex<HashMap<ItemRef, Vec<Comment>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All items received so far
    pub fn items(&self) -> Vec<ContentItem> {
        self.items.lock().unwrap().clone()
    }

    /// All comments received so far for one item
    pub fn comments_for(&self, item_id: &str) -> Vec<Comment> {
        self.comments
            .lock()
            .unwrap()
            .get(item_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of comments received for one item
    pub fn comment_count(&self, item_id: &str) -> usize {
        self.comments
            .lock()
            .unwrap()
            .get(item_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Item ids that received at least one comment page
    pub fn commented_items(&self) -> Vec<ItemRef> {
        let mut ids: Vec<_> = self.comments.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn on_items(&self, items: &[ContentItem]) {
        self.items.lock().unwrap().extend_from_slice(items);
    }

    async fn on_comments(&self, item_id: &ItemRef, comments: &[Comment]) {
        self.comments
            .lock()
            .unwrap()
            .entry(item_id.clone())
            .or_default()
            .extend_from_slice(comments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            raw: json!({ "aweme_id": id }),
        }
    }

    fn comment(id: &str) -> Comment {
        Comment {
            id: id.to_string(),
            parent_id: None,
            reply_count: 0,
            raw: json!({ "cid": id }),
        }
    }

    #[tokio::test]
    async fn test_memory_sink_accumulates_items() {
        let sink = MemorySink::new();
        sink.on_items(&[item("1"), item("2")]).await;
        sink.on_items(&[item("3")]).await;
        assert_eq!(sink.items().len(), 3);
    }

    #[tokio::test]
    async fn test_memory_sink_groups_comments_by_item() {
        let sink = MemorySink::new();
        let id_a = "a".to_string();
        let id_b = "b".to_string();

        sink.on_comments(&id_a, &[comment("c1"), comment("c2")]).await;
        sink.on_comments(&id_b, &[comment("c3")]).await;
        sink.on_comments(&id_a, &[comment("c4")]).await;

        assert_eq!(sink.comment_count("a"), 3);
        assert_eq!(sink.comment_count("b"), 1);
        assert_eq!(sink.commented_items(), vec!["a".to_string(), "b".to_string()]);
    }
}
