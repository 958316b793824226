//! API settings loading and defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Pagination style applied to views that do not pick one explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
    /// Views return every row unless they configure a paginator
    #[default]
    None,
    /// `{count, next, previous, results}` envelope
    PageNumber,
    /// Bare results with a `Link` header
    LinkHeader,
}

/// Project-wide API settings
///
/// Every field has a default, so a settings file only needs the keys it
/// changes:
///
/// ```yaml
/// default_pagination: page_number
/// page_size: 50
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    /// Pagination used by `ViewConfig::from_settings`
    pub default_pagination: PaginationStyle,

    /// Rows per page when the client does not ask for a size
    pub page_size: usize,

    /// Upper bound for a client-requested page size
    pub max_page_size: usize,

    /// Query parameter carrying the page number
    pub page_query_param: String,

    /// Query parameter carrying the requested page size
    pub page_size_query_param: String,

    /// Prefix of field filters, as in `filter[name]=value`
    pub filter_query_param: String,

    /// Query parameter carrying the search term
    pub search_query_param: String,

    /// Query parameter carrying the ordering, as in `order=name,-id`
    pub order_query_param: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            default_pagination: PaginationStyle::None,
            page_size: 20,
            max_page_size: 100,
            page_query_param: "page".to_string(),
            page_size_query_param: "page_size".to_string(),
            filter_query_param: "filter".to_string(),
            search_query_param: "search".to_string(),
            order_query_param: "order".to_string(),
        }
    }
}

impl ApiSettings {
    /// Load settings from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load settings from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the page size bounds
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.max_page_size < self.page_size {
            anyhow::bail!(
                "max_page_size ({}) must not be smaller than page_size ({})",
                self.max_page_size,
                self.page_size
            );
        }
        Ok(())
    }
}
