//! Configuration types and validation
//!
//! The harvester core does not load configuration from files or flags; the
//! embedding application constructs [`HarvestConfig`] and passes it in.
//! Validation catches mode/input mismatches before any request is made.

mod types;
mod validation;

pub use types::{
    CrawlMode, HarvestConfig, PacingConfig, PublishWindow, SortOrder,
};
pub use validation::validate;
