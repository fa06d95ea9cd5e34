//! Crawl orchestrator
//!
//! [`Harvester`] sequences the lower components across the three crawl
//! modes. Keywords and creators are processed sequentially; per-item work
//! (detail fetches, comment harvests) fans out through the bounded
//! [`FetchPool`]. Stream and task failures are logged and contained: they
//! never cross keyword, creator, or item boundaries, and they never
//! propagate past `run`.

use crate::client::ApiClient;
use crate::config::{self, CrawlMode, HarvestConfig};
use crate::crawler::pacing::RateLimitPolicy;
use crate::crawler::pool::{FetchOutcome, FetchPool};
use crate::crawler::streams::{CommentHarvest, CreatorPostStream, SearchStream};
use crate::model::{ContentItem, ItemRef};
use crate::sink::Sink;
use crate::{HarvestError, Result};
use std::sync::Arc;

/// Top-level harvester state machine
pub struct Harvester {
    config: Arc<HarvestConfig>,
    client: Arc<ApiClient>,
    sink: Arc<dyn Sink>,
    pool: FetchPool,
    pacing: RateLimitPolicy,
}

impl Harvester {
    /// Validates the configuration and assembles the orchestrator
    pub fn new(
        config: HarvestConfig,
        client: Arc<ApiClient>,
        sink: Arc<dyn Sink>,
    ) -> Result<Self> {
        config::validate(&config)?;
        let pool = FetchPool::new(config.concurrency);
        let pacing = RateLimitPolicy::from_config(&config.pacing);

        Ok(Self {
            config: Arc::new(config),
            client,
            sink,
            pool,
            pacing,
        })
    }

    /// Runs the configured crawl mode to completion
    ///
    /// Page and task failures are contained and logged; only configuration
    /// problems surface as errors here.
    pub async fn run(&self) -> Result<()> {
        if !self.client.login_valid() {
            tracing::warn!("session did not pass login detection; expect soft-blocks");
        }

        match self.config.mode {
            CrawlMode::Search => self.run_search().await,
            CrawlMode::Detail => self.run_detail().await,
            CrawlMode::Creator => self.run_creator().await,
        }

        tracing::info!("harvest finished");
        Ok(())
    }

    /// Search mode: keyword streams, then the comment sub-pipeline
    async fn run_search(&self) {
        for keyword in &self.config.keywords {
            tracing::info!(%keyword, "searching keyword");

            let stream = SearchStream::new(
                self.client.clone(),
                self.pacing.clone(),
                keyword.clone(),
                &self.config,
            );

            let sink = self.sink.clone();
            let outcome = stream
                .drain(|items| {
                    let sink = sink.clone();
                    async move {
                        sink.on_items(&items).await;
                    }
                })
                .await;

            let ids: Vec<ItemRef> = outcome.items.iter().map(|item| item.id.clone()).collect();
            tracing::info!(%keyword, collected = ids.len(), "keyword search done");

            self.harvest_comments(ids).await;
        }
    }

    /// Detail mode: concurrent detail fetches over the fixed id list, then
    /// the comment sub-pipeline over the same list
    async fn run_detail(&self) {
        let ids = self.config.item_ids.clone();

        let client = self.client.clone();
        let outcomes = self
            .pool
            .run_all(ids.clone(), move |id| {
                let client = client.clone();
                async move { client.item_detail(&id).await }
            })
            .await;

        let details = collect_details(outcomes);
        if !details.is_empty() {
            self.sink.on_items(&details).await;
        }

        self.harvest_comments(ids).await;
    }

    /// Creator mode: profile, post stream with concurrent detail fan-out,
    /// then the comment sub-pipeline over everything collected
    async fn run_creator(&self) {
        for creator_id in &self.config.creator_ids {
            tracing::info!(creator = %creator_id, "harvesting creator");

            match self.client.creator_profile(creator_id).await {
                Ok(profile) => self.sink.on_items(std::slice::from_ref(&profile)).await,
                Err(e) => {
                    tracing::error!(creator = %creator_id, error = %e, "profile fetch failed")
                }
            }

            self.pacing.pause().await;

            let stream = CreatorPostStream::new(
                self.client.clone(),
                self.pacing.clone(),
                creator_id.clone(),
            );

            let pool = self.pool.clone();
            let client = self.client.clone();
            let sink = self.sink.clone();
            let outcome = stream
                .drain(move |items| {
                    let pool = pool.clone();
                    let client = client.clone();
                    let sink = sink.clone();
                    async move {
                        let ids: Vec<ItemRef> =
                            items.iter().map(|item| item.id.clone()).collect();
                        let outcomes = pool
                            .run_all(ids, move |id| {
                                let client = client.clone();
                                async move { client.item_detail(&id).await }
                            })
                            .await;
                        let details = collect_details(outcomes);
                        if !details.is_empty() {
                            sink.on_items(&details).await;
                        }
                    }
                })
                .await;

            let ids: Vec<ItemRef> = outcome.items.iter().map(|item| item.id.clone()).collect();
            self.harvest_comments(ids).await;
        }
    }

    /// Shared comment sub-pipeline: one pool task per item, each driving a
    /// sequential comment stream (plus reply streams) up to the cap
    async fn harvest_comments(&self, ids: Vec<ItemRef>) {
        if !self.config.fetch_comments {
            tracing::info!("comment harvesting disabled");
            return;
        }
        if ids.is_empty() {
            return;
        }

        let harvest = CommentHarvest::new(
            self.client.clone(),
            self.pacing.clone(),
            self.sink.clone(),
            self.config.comment_cap,
            self.config.fetch_sub_comments,
        );

        let outcomes = self
            .pool
            .run_all(ids, move |id| {
                let harvest = harvest.clone();
                async move {
                    let outcome = harvest.drain(id).await;
                    match outcome.error {
                        Some(e) => Err(e),
                        None => Ok(outcome.items.len()),
                    }
                }
            })
            .await;

        for outcome in outcomes {
            match outcome.result {
                Ok(count) => {
                    tracing::debug!(item = %outcome.item, comments = count, "comments harvested")
                }
                Err(e) => {
                    // Partial pages were already forwarded to the sink
                    // before the stream aborted.
                    tracing::error!(item = %outcome.item, error = %e, "comment harvest aborted")
                }
            }
        }
    }
}

/// Keeps successful detail payloads, logs failures, skips missing items
fn collect_details(outcomes: Vec<FetchOutcome<ContentItem>>) -> Vec<ContentItem> {
    let mut details = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(item) => details.push(item),
            Err(HarvestError::ItemNotFound { id }) => {
                tracing::debug!(item = %id, "item not found, skipping")
            }
            Err(e) => {
                tracing::error!(item = %outcome.item, error = %e, "detail fetch failed")
            }
        }
    }
    details
}
