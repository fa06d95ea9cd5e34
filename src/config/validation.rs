use crate::config::types::{CrawlMode, HarvestConfig};
use crate::ConfigError;

/// Page offsets are 32-bit on the wire; this keeps them far from overflow
const MAX_START_PAGE: u32 = 100_000;

/// Validates the entire harvest configuration
pub fn validate(config: &HarvestConfig) -> Result<(), ConfigError> {
    validate_mode_inputs(config)?;
    validate_limits(config)?;
    Ok(())
}

/// Each mode requires its own non-empty input list
fn validate_mode_inputs(config: &HarvestConfig) -> Result<(), ConfigError> {
    match config.mode {
        CrawlMode::Search => {
            if config.keywords.is_empty() {
                return Err(ConfigError::Validation(
                    "search mode requires at least one keyword".to_string(),
                ));
            }
            if config.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::Validation(
                    "keywords must not be blank".to_string(),
                ));
            }
        }
        CrawlMode::Detail => {
            if config.item_ids.is_empty() {
                return Err(ConfigError::Validation(
                    "detail mode requires at least one item id".to_string(),
                ));
            }
        }
        CrawlMode::Creator => {
            if config.creator_ids.is_empty() {
                return Err(ConfigError::Validation(
                    "creator mode requires at least one creator id".to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn validate_limits(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.max_items_per_keyword < 1 {
        return Err(ConfigError::Validation(format!(
            "max_items_per_keyword must be >= 1, got {}",
            config.max_items_per_keyword
        )));
    }

    if config.comment_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "comment_cap must be >= 1, got {}",
            config.comment_cap
        )));
    }

    if config.start_page > MAX_START_PAGE {
        return Err(ConfigError::Validation(format!(
            "start_page must be <= {}, got {}",
            MAX_START_PAGE, config.start_page
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_config() -> HarvestConfig {
        let mut config = HarvestConfig::for_mode(CrawlMode::Search);
        config.keywords = vec!["rust".to_string()];
        config
    }

    #[test]
    fn test_valid_search_config() {
        assert!(validate(&search_config()).is_ok());
    }

    #[test]
    fn test_search_requires_keywords() {
        let config = HarvestConfig::for_mode(CrawlMode::Search);
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("keyword"));
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let mut config = search_config();
        config.keywords.push("   ".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_detail_requires_ids() {
        let config = HarvestConfig::for_mode(CrawlMode::Detail);
        assert!(validate(&config).is_err());

        let mut config = HarvestConfig::for_mode(CrawlMode::Detail);
        config.item_ids = vec!["7001".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_creator_requires_ids() {
        let config = HarvestConfig::for_mode(CrawlMode::Creator);
        assert!(validate(&config).is_err());

        let mut config = HarvestConfig::for_mode(CrawlMode::Creator);
        config.creator_ids = vec!["MS4wLjAB".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = search_config();
        config.concurrency = 0;
        assert!(validate(&config).is_err());

        config.concurrency = 65;
        assert!(validate(&config).is_err());

        config.concurrency = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_comment_cap_rejected() {
        let mut config = search_config();
        config.comment_cap = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_max_items_rejected() {
        let mut config = search_config();
        config.max_items_per_keyword = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_start_page_bound() {
        let mut config = search_config();
        config.start_page = MAX_START_PAGE;
        assert!(validate(&config).is_ok());

        config.start_page = MAX_START_PAGE + 1;
        assert!(validate(&config).is_err());
    }
}
