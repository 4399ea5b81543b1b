//! Scoped search: resolve, expand, authorize, match, paginate.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, Instrument};

use crate::catalog::{expand_scope, resolve, CatalogAccess};
use crate::config::SearchConfig;
use crate::error::SearchResult;
use crate::matcher::FragmentMatcher;
use crate::paging::{paginate, PageRequest, SearchResultPage};
use crate::permission::{filter_authorized, PermissionAccess, UserIdentity};

/// One search request. Built per call and never mutated.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    pub container_id: String,
    pub fragment: String,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl SearchQuery {
    pub fn new(container_id: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            fragment: fragment.into(),
            page: None,
            page_size: None,
        }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Searches the items beneath a container on behalf of a user.
#[derive(Clone)]
pub struct ScopedSearch {
    catalog: Arc<dyn CatalogAccess>,
    permissions: Arc<dyn PermissionAccess>,
    config: SearchConfig,
}

impl ScopedSearch {
    pub fn new(catalog: Arc<dyn CatalogAccess>, permissions: Arc<dyn PermissionAccess>) -> Self {
        Self {
            catalog,
            permissions,
            config: SearchConfig::default(),
        }
    }

    /// Replace the default limits. The configuration is validated first so
    /// every default query stays answerable.
    pub fn with_config(mut self, config: SearchConfig) -> anyhow::Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Errors are checked in a fixed order: unknown container, then short
    /// fragment, then oversized page. Nothing is filtered or matched once
    /// one of them fails.
    pub async fn search(&self, user: &UserIdentity, query: &SearchQuery) -> SearchResult<SearchResultPage> {
        let span = tracing::debug_span!(
            "scoped_search",
            container = %query.container_id,
            user = %user,
        );
        self.run(user, query).instrument(span).await
    }

    async fn run(&self, user: &UserIdentity, query: &SearchQuery) -> SearchResult<SearchResultPage> {
        let container = resolve(self.catalog.as_ref(), &query.container_id).await?;
        let matcher = FragmentMatcher::new(&query.fragment)?;
        let request = PageRequest::new(query.page, query.page_size, &self.config)?;

        let scope = expand_scope(self.catalog.as_ref(), &container).await?;
        let scope_len = scope.len();
        let authorized = filter_authorized(self.permissions.as_ref(), user, scope).await?;
        let authorized_len = authorized.len();
        let matches = matcher.apply(authorized);
        debug!(
            scope = scope_len,
            authorized = authorized_len,
            matches = matches.len(),
            "scoped search evaluated"
        );
        Ok(paginate(matches, request))
    }
}
