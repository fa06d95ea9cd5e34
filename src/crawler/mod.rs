//! Crawl orchestration
//!
//! This module contains the moving parts above the request pipeline:
//! - Pacing policy between dependent page fetches ([`RateLimitPolicy`])
//! - The bounded per-item fetch pool ([`FetchPool`])
//! - Sequential pagination streams ([`SearchStream`], [`CommentHarvest`],
//!   [`CreatorPostStream`])
//! - The top-level mode orchestrator ([`Harvester`])

mod coordinator;
mod pacing;
mod pool;
mod streams;

pub use coordinator::Harvester;
pub use pacing::RateLimitPolicy;
pub use pool::{FetchOutcome, FetchPool};
pub use streams::{CommentHarvest, CreatorPostStream, SearchStream, StreamOutcome};
