//! Harvester data model
//!
//! Thin typed views over the opaque JSON the remote API returns. Page
//! envelopes keep their pagination fields (`cursor`, `has_more`,
//! `max_cursor`) typed while the item payloads stay as raw
//! [`serde_json::Value`]s; the sink decides what to persist.
//!
//! Extraction functions return a plain message on failure; the request
//! pipeline wraps that into a `DataFetch` error with endpoint and body
//! context.

use serde_json::Value;

/// Identifier of a harvestable unit (content id or comment id)
pub type ItemRef = String;

/// One content item with its opaque payload
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Remote content id
    pub id: ItemRef,

    /// Full payload as returned by the API
    pub raw: Value,
}

/// Whether a comment spawns a reply stream
///
/// Expansion is a pure function of the comment: either there is nothing to
/// fetch, or exactly one reply stream with the advertised count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyExpansion {
    /// No replies; nothing further to fetch
    None,
    /// The comment advertises this many replies
    Replies(u64),
}

/// One comment (top-level or reply) with its opaque payload
#[derive(Debug, Clone)]
pub struct Comment {
    /// Remote comment id
    pub id: ItemRef,

    /// Root comment id when this is a reply
    pub parent_id: Option<ItemRef>,

    /// Number of replies the remote service advertises for this comment
    pub reply_count: u64,

    /// Full payload as returned by the API
    pub raw: Value,
}

impl Comment {
    /// Maps the reply counter into the tagged expansion variant
    pub fn expansion(&self) -> ReplyExpansion {
        if self.reply_count > 0 {
            ReplyExpansion::Replies(self.reply_count)
        } else {
            ReplyExpansion::None
        }
    }
}

/// One page of keyword search results
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Items extracted from this page
    pub items: Vec<ContentItem>,

    /// Server-issued search session id, echoed on subsequent pages of the
    /// same keyword to keep ranking continuity
    pub search_id: String,
}

/// One page of comments or replies
#[derive(Debug, Clone)]
pub struct CommentPage {
    pub comments: Vec<Comment>,

    /// Opaque continuation cursor for the next page
    pub cursor: String,

    /// Whether the server advertises further pages
    pub has_more: bool,
}

/// One page of a creator's posted items
#[derive(Debug, Clone)]
pub struct PostsPage {
    pub items: Vec<ContentItem>,

    /// Opaque continuation cursor for the next page
    pub max_cursor: String,

    /// Whether the server advertises further pages
    pub has_more: bool,
}

/// `has_more` arrives as 0/1 or as a bool depending on the endpoint
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0) != 0,
        _ => false,
    }
}

/// Cursors arrive as numbers (comment pages) or strings (creator pages);
/// both are carried as opaque strings and echoed back verbatim
fn cursor_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts a search result page
///
/// The `data` array must be present (its absence is the risk-control
/// signature); each entry holds the item under `aweme_info`, or for mix
/// entries under `aweme_mix_info.mix_items[0]`. Entries with neither shape
/// are skipped.
pub fn parse_search_page(body: &Value) -> Result<SearchPage, String> {
    let data = body
        .get("data")
        .ok_or_else(|| "missing top-level field `data`".to_string())?;

    let entries = match data {
        Value::Array(entries) => entries.as_slice(),
        Value::Null => &[],
        _ => return Err("`data` is not an array".to_string()),
    };

    let mut items = Vec::new();
    for entry in entries {
        let info = entry.get("aweme_info").filter(|v| !v.is_null()).or_else(|| {
            entry
                .get("aweme_mix_info")
                .and_then(|mix| mix.get("mix_items"))
                .and_then(|mix_items| mix_items.get(0))
        });

        let Some(info) = info else {
            continue;
        };
        let Some(id) = string_field(info, "aweme_id") else {
            continue;
        };
        items.push(ContentItem {
            id,
            raw: info.clone(),
        });
    }

    let search_id = body
        .get("extra")
        .and_then(|extra| extra.get("logid"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(SearchPage { items, search_id })
}

/// Extracts an item detail payload; `None` when the id does not exist
pub fn parse_item_detail(body: &Value) -> Result<Option<ContentItem>, String> {
    match body.get("aweme_detail") {
        None | Some(Value::Null) => Ok(None),
        Some(detail) => {
            let id = string_field(detail, "aweme_id")
                .ok_or_else(|| "detail payload missing `aweme_id`".to_string())?;
            Ok(Some(ContentItem {
                id,
                raw: detail.clone(),
            }))
        }
    }
}

/// Extracts a comment or reply page
pub fn parse_comment_page(body: &Value) -> Result<CommentPage, String> {
    let comments = match body.get("comments") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| {
                let id = string_field(entry, "cid")?;
                let parent_id = string_field(entry, "reply_id").filter(|p| p != "0");
                let reply_count = entry
                    .get("reply_comment_total")
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                Some(Comment {
                    id,
                    parent_id,
                    reply_count,
                    raw: entry.clone(),
                })
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        _ => return Err("`comments` is not an array".to_string()),
    };

    Ok(CommentPage {
        comments,
        cursor: cursor_string(body.get("cursor")),
        has_more: truthy(body.get("has_more")),
    })
}

/// Extracts one page of a creator's posted items
pub fn parse_posts_page(body: &Value) -> Result<PostsPage, String> {
    let items = match body.get("aweme_list") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| {
                let id = string_field(entry, "aweme_id")?;
                Some(ContentItem {
                    id,
                    raw: entry.clone(),
                })
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        _ => return Err("`aweme_list` is not an array".to_string()),
    };

    Ok(PostsPage {
        items,
        max_cursor: cursor_string(body.get("max_cursor")),
        has_more: truthy(body.get("has_more")),
    })
}
