//! Typed calls for each harvested resource
//!
//! One method per endpoint, each delegating to the pipeline and extracting
//! the page envelope from the JSON body. Page sizes are fixed by the remote
//! API, not configurable.

use crate::client::pipeline::ApiClient;
use crate::config::{PublishWindow, SortOrder};
use crate::model::{
    self, CommentPage, ContentItem, PostsPage, SearchPage,
};
use crate::{HarvestError, Result};
use serde_json::json;
use url::Url;

const SEARCH_PATH: &str = "/aweme/v1/web/general/search/single/";
const DETAIL_PATH: &str = "/aweme/v1/web/aweme/detail/";
const COMMENTS_PATH: &str = "/aweme/v1/web/comment/list/";
const REPLIES_PATH: &str = "/aweme/v1/web/comment/list/reply/";
const PROFILE_PATH: &str = "/aweme/v1/web/user/profile/other/";
const POSTS_PATH: &str = "/aweme/v1/web/aweme/post/";

/// Items per search page, fixed by the API
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// Comments (and replies) per page, fixed by the API
pub const COMMENT_PAGE_SIZE: u32 = 20;

/// Posts per creator page, fixed by the API
pub const POSTS_PAGE_SIZE: u32 = 18;

impl ApiClient {
    /// Fetches one page of keyword search results
    ///
    /// `search_id` must echo the value returned by the previous page of the
    /// same keyword (empty on the first page) so the server keeps ranking
    /// continuity across the stream.
    pub async fn search_page(
        &self,
        keyword: &str,
        offset: u32,
        search_id: &str,
        sort_order: SortOrder,
        publish_window: PublishWindow,
    ) -> Result<SearchPage> {
        let mut params = vec![
            ("search_channel", "aweme_general".to_string()),
            ("enable_history", "1".to_string()),
            ("keyword", keyword.to_string()),
            ("search_source", "tab_search".to_string()),
            ("query_correct_type", "1".to_string()),
            ("is_filter_search", "0".to_string()),
            ("offset", offset.to_string()),
            ("count", SEARCH_PAGE_SIZE.to_string()),
            ("need_filter_settings", "1".to_string()),
            ("list_type", "multi".to_string()),
            ("search_id", search_id.to_string()),
        ];

        // Non-default filters ride in a nested JSON parameter.
        if sort_order != SortOrder::General || publish_window != PublishWindow::Unlimited {
            let filter = json!({
                "sort_type": sort_order.wire_value().to_string(),
                "publish_time": publish_window.wire_value().to_string(),
            });
            params.push(("filter_selected", filter.to_string()));
            params.retain(|(k, _)| *k != "is_filter_search");
            params.push(("is_filter_search", "1".to_string()));
        }

        let referer = self.search_referer(keyword)?;
        let body = self.get(SEARCH_PATH, &params, Some(referer)).await?;

        model::parse_search_page(&body)
            .map_err(|message| self.structure_error(SEARCH_PATH, message, &body))
    }

    /// Fetches the full detail payload for one item
    ///
    /// A valid response without a detail payload means the id does not
    /// exist; that is surfaced as `ItemNotFound` so callers can skip it.
    pub async fn item_detail(&self, item_id: &str) -> Result<ContentItem> {
        let params = vec![("aweme_id", item_id.to_string())];
        let body = self.get(DETAIL_PATH, &params, None).await?;

        match model::parse_item_detail(&body)
            .map_err(|message| self.structure_error(DETAIL_PATH, message, &body))?
        {
            Some(item) => Ok(item),
            None => Err(HarvestError::ItemNotFound {
                id: item_id.to_string(),
            }),
        }
    }

    /// Fetches one page of top-level comments for an item
    pub async fn comment_page(&self, item_id: &str, cursor: &str) -> Result<CommentPage> {
        let params = vec![
            ("aweme_id", item_id.to_string()),
            ("cursor", cursor.to_string()),
            ("count", COMMENT_PAGE_SIZE.to_string()),
            ("item_type", "0".to_string()),
        ];
        let body = self.get(COMMENTS_PATH, &params, None).await?;

        model::parse_comment_page(&body)
            .map_err(|message| self.structure_error(COMMENTS_PATH, message, &body))
    }

    /// Fetches one page of replies under a comment
    pub async fn reply_page(&self, comment_id: &str, cursor: &str) -> Result<CommentPage> {
        let params = vec![
            ("comment_id", comment_id.to_string()),
            ("cursor", cursor.to_string()),
            ("count", COMMENT_PAGE_SIZE.to_string()),
            ("item_type", "0".to_string()),
        ];
        let body = self.get(REPLIES_PATH, &params, None).await?;

        model::parse_comment_page(&body)
            .map_err(|message| self.structure_error(REPLIES_PATH, message, &body))
    }

    /// Fetches a creator's profile, wrapped as a content item keyed by the
    /// creator id
    pub async fn creator_profile(&self, creator_id: &str) -> Result<ContentItem> {
        let params = vec![
            ("sec_user_id", creator_id.to_string()),
            ("publish_video_strategy_type", "2".to_string()),
            ("personal_center_strategy", "1".to_string()),
        ];
        let body = self.get(PROFILE_PATH, &params, None).await?;

        let user = body.get("user").filter(|u| !u.is_null()).cloned();
        let raw = user.unwrap_or(body);
        Ok(ContentItem {
            id: creator_id.to_string(),
            raw,
        })
    }

    /// Fetches one page of a creator's posted items
    pub async fn creator_posts_page(
        &self,
        creator_id: &str,
        max_cursor: &str,
    ) -> Result<PostsPage> {
        let params = vec![
            ("sec_user_id", creator_id.to_string()),
            ("count", POSTS_PAGE_SIZE.to_string()),
            ("max_cursor", max_cursor.to_string()),
            ("locate_query", "false".to_string()),
            ("publish_video_strategy_type", "2".to_string()),
        ];
        let body = self.get(POSTS_PATH, &params, None).await?;

        model::parse_posts_page(&body)
            .map_err(|message| self.structure_error(POSTS_PATH, message, &body))
    }

    /// Referer mimicking a visit from the keyword's search page
    fn search_referer(&self, keyword: &str) -> Result<String> {
        let mut url = Url::parse(self.base_url())?;
        url.set_path(&format!("search/{}", keyword));
        url.set_query(Some("type=general"));
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::pipeline::SigningOracle;
    use crate::session::SessionState;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedSigner;

    #[async_trait]
    impl SigningOracle for FixedSigner {
        async fn sign(
            &self,
            _path: &str,
            _query: &str,
            _body: Option<&str>,
            _user_agent: &str,
        ) -> Result<String> {
            Ok("t".to_string())
        }
    }

    fn test_client(base_url: &str) -> ApiClient {
        let session = SessionState::new(vec![], "TestAgent/1.0".to_string());
        ApiClient::with_base_url(base_url, session, Arc::new(FixedSigner), None).unwrap()
    }

    #[tokio::test]
    async fn test_search_page_echoes_search_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("keyword", "rust"))
            .and(query_param("offset", "10"))
            .and(query_param("search_id", "prev-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [ { "aweme_info": { "aweme_id": "1" } } ],
                "extra": { "logid": "next-id" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let page = client
            .search_page("rust", 10, "prev-id", SortOrder::General, PublishWindow::Unlimited)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.search_id, "next-id");
    }

    #[tokio::test]
    async fn test_search_page_with_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("is_filter_search", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let page = client
            .search_page("rust", 0, "", SortOrder::Latest, PublishWindow::OneWeek)
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_item_detail_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DETAIL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status_code": 0 })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.item_detail("404").await.unwrap_err();
        assert!(matches!(err, HarvestError::ItemNotFound { .. }));
    }

    #[tokio::test]
    async fn test_comment_page_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(COMMENTS_PATH))
            .and(query_param("aweme_id", "7001"))
            .and(query_param("cursor", "20"))
            .and(query_param("count", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "comments": [ { "cid": "c1" } ],
                "cursor": 40,
                "has_more": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let page = client.comment_page("7001", "20").await.unwrap();
        assert_eq!(page.cursor, "40");
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn test_creator_profile_unwraps_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PROFILE_PATH))
            .and(query_param("sec_user_id", "MS4w"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "nickname": "someone" }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let profile = client.creator_profile("MS4w").await.unwrap();
        assert_eq!(profile.id, "MS4w");
        assert_eq!(profile.raw["nickname"], "someone");
    }

    #[tokio::test]
    async fn test_creator_posts_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POSTS_PATH))
            .and(query_param("max_cursor", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "aweme_list": [ { "aweme_id": "9001" } ],
                "max_cursor": "123",
                "has_more": 1
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let page = client.creator_posts_page("MS4w", "").await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.max_cursor, "123");
    }

    #[test]
    fn test_search_referer_encodes_keyword() {
        let client = test_client("https://www.example.com");
        let referer = client.search_referer("hello world").unwrap();
        assert!(referer.starts_with("https://www.example.com/search/hello%20world"));
        assert!(referer.ends_with("type=general"));
    }
}
