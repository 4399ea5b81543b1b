//! Limits applied to scoped searches.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: usize = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: usize = 500;
/// Shortest trimmed fragment, in characters, a search accepts.
pub const MIN_FRAGMENT_LEN: usize = 2;
/// Bound on parent walks through the catalog hierarchy.
pub const MAX_DEPTH: usize = 64;

/// Configuration for the scoped search
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Page size applied when none is requested (default 10)
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Ceiling on requested page sizes. May be lowered, never raised
    /// above `MAX_LIMIT` (default 500)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Maximum number of ancestors or descendant levels visited (default 64)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_page_size() -> usize { DEFAULT_LIMIT }
fn default_max_page_size() -> usize { MAX_LIMIT }
fn default_max_depth() -> usize { MAX_DEPTH }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_depth: default_max_depth(),
        }
    }
}

impl SearchConfig {
    /// Build a configuration from `CATALOG_HUB_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = lookup("CATALOG_HUB_DEFAULT_PAGE_SIZE") {
            config.default_page_size = v
                .parse()
                .with_context(|| format!("invalid CATALOG_HUB_DEFAULT_PAGE_SIZE '{v}'"))?;
        }
        if let Some(v) = lookup("CATALOG_HUB_MAX_PAGE_SIZE") {
            config.max_page_size = v
                .parse()
                .with_context(|| format!("invalid CATALOG_HUB_MAX_PAGE_SIZE '{v}'"))?;
        }
        if let Some(v) = lookup("CATALOG_HUB_MAX_DEPTH") {
            config.max_depth = v
                .parse()
                .with_context(|| format!("invalid CATALOG_HUB_MAX_DEPTH '{v}'"))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 || self.max_page_size > MAX_LIMIT {
            anyhow::bail!(
                "max page size {} must be between 1 and {}",
                self.max_page_size,
                MAX_LIMIT
            );
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default page size {} must be between 1 and {}",
                self.default_page_size,
                self.max_page_size
            );
        }
        if self.max_depth == 0 {
            anyhow::bail!("max depth must be at least 1");
        }
        Ok(())
    }
}
