//! Case-insensitive name matching.

use crate::catalog::ResourceNode;
use crate::config::MIN_FRAGMENT_LEN;
use crate::error::{SearchError, SearchResult};

/// A validated, lower-cased search fragment.
#[derive(Debug, Clone)]
pub struct FragmentMatcher {
    needle: String,
}

impl FragmentMatcher {
    /// Fails unless the trimmed fragment has at least `MIN_FRAGMENT_LEN`
    /// characters.
    pub fn new(fragment: &str) -> SearchResult<Self> {
        let trimmed = fragment.trim();
        if trimmed.chars().count() < MIN_FRAGMENT_LEN {
            return Err(SearchError::invalid(format!(
                "Minimum search is {MIN_FRAGMENT_LEN} characters"
            )));
        }
        Ok(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    /// Matching items ordered by name, then id, so repeated queries page
    /// identically.
    pub fn apply(&self, items: Vec<ResourceNode>) -> Vec<ResourceNode> {
        let mut matches: Vec<(String, ResourceNode)> = items
            .into_iter()
            .filter_map(|item| {
                let folded = item.name.to_lowercase();
                folded.contains(&self.needle).then_some((folded, item))
            })
            .collect();
        matches.sort_by(|(a_key, a), (b_key, b)| {
            a_key
                .cmp(b_key)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.into_iter().map(|(_, item)| item).collect()
    }
}

/// Match `items` against `fragment`.
pub fn match_items(fragment: &str, items: Vec<ResourceNode>) -> SearchResult<Vec<ResourceNode>> {
    Ok(FragmentMatcher::new(fragment)?.apply(items))
}
