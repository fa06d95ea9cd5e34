use serde::Deserialize;

/// Top-level crawl mode. The three modes are mutually exclusive; each drives
/// a different linear pipeline over the same lower components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrawlMode {
    /// Keyword search → items → comments
    Search,
    /// Fixed id list → details → comments
    Detail,
    /// Creator profiles → posted items → comments
    Creator,
}

/// Search result ordering requested from the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    General,
    MostLiked,
    Latest,
}

impl SortOrder {
    /// Wire value understood by the search endpoint
    pub fn wire_value(self) -> u8 {
        match self {
            SortOrder::General => 0,
            SortOrder::MostLiked => 1,
            SortOrder::Latest => 2,
        }
    }
}

/// Publish-time window filter for keyword search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishWindow {
    #[default]
    Unlimited,
    OneDay,
    OneWeek,
    SixMonths,
}

impl PublishWindow {
    /// Wire value understood by the search endpoint
    pub fn wire_value(self) -> u16 {
        match self {
            PublishWindow::Unlimited => 0,
            PublishWindow::OneDay => 1,
            PublishWindow::OneWeek => 7,
            PublishWindow::SixMonths => 180,
        }
    }
}

/// Pacing policy between dependent page fetches of one stream
///
/// The base delay plus a bounded random jitter is awaited between page
/// *i* and page *i+1* of the same pagination stream. Independent per-item
/// tasks are not paced; they are bounded only by the pool width.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Base delay between sequential page fetches (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Upper bound of the uniform random jitter added on top (milliseconds)
    #[serde(rename = "jitter-ms", default)]
    pub jitter_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            jitter_ms: 2_000,
        }
    }
}

/// Harvester behavior configuration, supplied by the embedding application
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Which crawl pipeline to run
    pub mode: CrawlMode,

    /// Keywords for `Search` mode
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Fixed item ids for `Detail` mode
    #[serde(rename = "item-ids", default)]
    pub item_ids: Vec<String>,

    /// Creator ids for `Creator` mode
    #[serde(rename = "creator-ids", default)]
    pub creator_ids: Vec<String>,

    /// Ceiling on items collected per keyword; the search stream stops once
    /// the next page offset would reach this value
    #[serde(rename = "max-items-per-keyword", default = "default_max_items")]
    pub max_items_per_keyword: u32,

    /// Per-item comment budget shared by top-level comments and replies
    #[serde(rename = "comment-cap", default = "default_comment_cap")]
    pub comment_cap: u32,

    /// Whether the comment sub-pipeline runs at all
    #[serde(rename = "fetch-comments", default = "default_true")]
    pub fetch_comments: bool,

    /// Whether comments with replies spawn reply streams
    #[serde(rename = "fetch-sub-comments", default)]
    pub fetch_sub_comments: bool,

    /// Width of the per-item fetch pool
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Pacing between sequential page fetches within one stream
    #[serde(default)]
    pub pacing: PacingConfig,

    /// First search page to request (pages before it are skipped)
    #[serde(rename = "start-page", default)]
    pub start_page: u32,

    /// Search result ordering
    #[serde(rename = "sort-order", default)]
    pub sort_order: SortOrder,

    /// Publish-time window filter for search
    #[serde(rename = "publish-window", default)]
    pub publish_window: PublishWindow,
}

fn default_max_items() -> u32 {
    200
}

fn default_comment_cap() -> u32 {
    100
}

fn default_concurrency() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

impl HarvestConfig {
    /// A minimal configuration for the given mode, with defaults elsewhere
    pub fn for_mode(mode: CrawlMode) -> Self {
        Self {
            mode,
            keywords: Vec::new(),
            item_ids: Vec::new(),
            creator_ids: Vec::new(),
            max_items_per_keyword: default_max_items(),
            comment_cap: default_comment_cap(),
            fetch_comments: true,
            fetch_sub_comments: false,
            concurrency: default_concurrency(),
            pacing: PacingConfig::default(),
            start_page: 0,
            sort_order: SortOrder::default(),
            publish_window: PublishWindow::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_mode_defaults() {
        let config = HarvestConfig::for_mode(CrawlMode::Search);
        assert_eq!(config.mode, CrawlMode::Search);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.comment_cap, 100);
        assert!(config.fetch_comments);
        assert!(!config.fetch_sub_comments);
        assert_eq!(config.start_page, 0);
    }

    #[test]
    fn test_sort_order_wire_values() {
        assert_eq!(SortOrder::General.wire_value(), 0);
        assert_eq!(SortOrder::MostLiked.wire_value(), 1);
        assert_eq!(SortOrder::Latest.wire_value(), 2);
    }

    #[test]
    fn test_publish_window_wire_values() {
        assert_eq!(PublishWindow::Unlimited.wire_value(), 0);
        assert_eq!(PublishWindow::OneDay.wire_value(), 1);
        assert_eq!(PublishWindow::OneWeek.wire_value(), 7);
        assert_eq!(PublishWindow::SixMonths.wire_value(), 180);
    }

    #[test]
    fn test_deserialize_kebab_case() {
        let json = r#"{
            "mode": "search",
            "keywords": ["rust"],
            "max-items-per-keyword": 25,
            "comment-cap": 50,
            "fetch-sub-comments": true,
            "pacing": { "base-delay-ms": 500, "jitter-ms": 100 }
        }"#;
        let config: HarvestConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mode, CrawlMode::Search);
        assert_eq!(config.max_items_per_keyword, 25);
        assert_eq!(config.comment_cap, 50);
        assert!(config.fetch_sub_comments);
        assert_eq!(config.pacing.base_delay_ms, 500);
        assert_eq!(config.pacing.jitter_ms, 100);
    }
}
