//! Page selection over an ordered match set.

use serde::{Deserialize, Serialize};

use crate::catalog::ResourceNode;
use crate::config::SearchConfig;
use crate::error::{SearchError, SearchResult};

/// A validated page selection. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Apply defaults for omitted values and enforce the configured ceiling.
    pub fn new(page: Option<usize>, page_size: Option<usize>, config: &SearchConfig) -> SearchResult<Self> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(config.default_page_size);
        if page_size > config.max_page_size {
            return Err(SearchError::invalid(format!(
                "Page size must be lower than or equal to {}",
                config.max_page_size
            )));
        }
        if page_size == 0 {
            return Err(SearchError::invalid("Page size must be greater than 0"));
        }
        if page == 0 {
            return Err(SearchError::invalid("Page index must be greater than 0"));
        }
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: crate::config::DEFAULT_LIMIT,
        }
    }
}

/// What a caller sees for one matched item.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: String,
}

impl From<ResourceNode> for ItemSummary {
    fn from(node: ResourceNode) -> Self {
        Self {
            id: node.id,
            key: node.key,
            name: node.name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResultPage {
    pub items: Vec<ItemSummary>,
    pub page: usize,
    pub page_size: usize,
    pub total_matches: usize,
}

impl SearchResultPage {
    /// Zero when `page_size` is zero, which only a hand-built or
    /// deserialized page can carry.
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_matches.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Cut one page out of `matches`. A page past the end is empty.
pub fn paginate(matches: Vec<ResourceNode>, request: PageRequest) -> SearchResultPage {
    let total_matches = matches.len();
    let items = matches
        .into_iter()
        .skip(request.offset())
        .take(request.page_size)
        .map(ItemSummary::from)
        .collect();
    SearchResultPage {
        items,
        page: request.page,
        page_size: request.page_size,
        total_matches,
    }
}
