//! Catalog hierarchy types and container resolution.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};

/// Different kinds of nodes in the catalog hierarchy.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Container,
    ChildContainer,
    Item,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Container => "container",
            ResourceKind::ChildContainer => "child_container",
            ResourceKind::Item => "item",
        }
    }

    /// Containers and child containers both admit descendants.
    pub fn is_container(&self) -> bool {
        !matches!(self, ResourceKind::Item)
    }
}

/// One entry of the hierarchy. Children point at their parent by id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceNode {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl ResourceNode {
    pub fn container(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ResourceKind::Container,
            parent_id: None,
            key: None,
        }
    }

    pub fn child_container(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ResourceKind::ChildContainer,
            parent_id: Some(parent_id.into()),
            key: None,
        }
    }

    pub fn item(id: impl Into<String>, name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ResourceKind::Item,
            parent_id: Some(parent_id.into()),
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn is_item(&self) -> bool {
        self.kind == ResourceKind::Item
    }
}

/// Read access to the catalog hierarchy.
#[async_trait]
pub trait CatalogAccess: Send + Sync {
    async fn get_node(&self, id: &str) -> Result<Option<ResourceNode>>;

    /// Every item beneath `container_id`, at any depth, in no particular order.
    async fn descendant_items(&self, container_id: &str) -> Result<Vec<ResourceNode>>;
}

/// Look up the node a query is scoped to.
pub async fn resolve(catalog: &dyn CatalogAccess, container_id: &str) -> SearchResult<ResourceNode> {
    catalog
        .get_node(container_id)
        .await?
        .ok_or_else(|| SearchError::NotFound(container_id.to_string()))
}

/// Items a query scoped to `node` considers. An item has no descendants,
/// so its scope is empty.
pub async fn expand_scope(
    catalog: &dyn CatalogAccess,
    node: &ResourceNode,
) -> SearchResult<Vec<ResourceNode>> {
    if !node.kind.is_container() {
        return Ok(Vec::new());
    }
    let mut items = catalog.descendant_items(&node.id).await?;
    items.retain(ResourceNode::is_item);
    Ok(items)
}
