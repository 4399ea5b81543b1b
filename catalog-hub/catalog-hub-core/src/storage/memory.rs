//! In-memory catalog hierarchy and permission assignments.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::catalog::{CatalogAccess, ResourceKind, ResourceNode};
use crate::config::MAX_DEPTH;
use crate::permission::{AccessLevel, PermissionAccess, PermissionGrant, Principal, UserIdentity};

/// Nodes keyed by id with parent back references, plus the grants and
/// group memberships needed to answer permission checks.
#[derive(Debug)]
pub struct CatalogStore {
    pub(crate) nodes: HashMap<String, ResourceNode>,
    children: HashMap<String, Vec<String>>,
    pub(crate) grants: HashMap<String, Vec<(Principal, AccessLevel)>>,
    pub(crate) memberships: HashMap<String, Vec<String>>,
    max_depth: usize,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            children: HashMap::new(),
            grants: HashMap::new(),
            memberships: HashMap::new(),
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    /// Add a node under an existing container. Roots must be containers.
    pub fn insert(&mut self, node: ResourceNode) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            bail!("duplicate node id '{}'", node.id);
        }
        match (&node.parent_id, node.kind) {
            (None, ResourceKind::Container) => {}
            (None, kind) => bail!("{} '{}' needs a parent", kind.as_str(), node.id),
            (Some(parent_id), _) => {
                let parent = self
                    .nodes
                    .get(parent_id)
                    .ok_or_else(|| anyhow!("parent '{}' of '{}' not found", parent_id, node.id))?;
                if !parent.kind.is_container() {
                    bail!("cannot add '{}' under item '{}'", node.id, parent_id);
                }
                self.children
                    .entry(parent_id.clone())
                    .or_default()
                    .push(node.id.clone());
            }
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Create a node with a generated id and return that id.
    pub fn create(&mut self, name: impl Into<String>, kind: ResourceKind, parent_id: Option<&str>) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.insert(ResourceNode {
            id: id.clone(),
            name: name.into(),
            kind,
            parent_id: parent_id.map(str::to_string),
            key: None,
        })?;
        Ok(id)
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| anyhow!("node '{}' not found", id))?;
        node.name = name.into();
        Ok(())
    }

    /// Re-parent a node. Containers cannot move into their own subtree.
    pub fn move_node(&mut self, id: &str, new_parent: &str) -> Result<()> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| anyhow!("node '{}' not found", id))?;
        let old_parent = match &node.parent_id {
            Some(p) => p.clone(),
            None => bail!("cannot move root container '{}'", id),
        };
        match self.nodes.get(new_parent) {
            Some(p) if p.kind.is_container() => {}
            Some(_) => bail!("cannot move '{}' under item '{}'", id, new_parent),
            None => bail!("parent '{}' not found", new_parent),
        }
        if self.is_ancestor_or_self(id, new_parent) {
            bail!("cannot move '{}' into its own descendant", id);
        }

        if let Some(siblings) = self.children.get_mut(&old_parent) {
            siblings.retain(|c| c != id);
        }
        self.children
            .entry(new_parent.to_string())
            .or_default()
            .push(id.to_string());
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_id = Some(new_parent.to_string());
        }
        Ok(())
    }

    /// Whether `ancestor` is `id` or lies on its parent chain. Walks the
    /// whole chain regardless of the depth limit; `seen` guards against a
    /// corrupted chain.
    fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            if !seen.insert(node_id) {
                return false;
            }
            current = self.nodes.get(node_id).and_then(|n| n.parent_id.as_deref());
        }
        false
    }

    pub fn grant(&mut self, principal: Principal, resource_id: &str, access: AccessLevel) -> Result<()> {
        if !self.nodes.contains_key(resource_id) {
            bail!("resource '{}' not found", resource_id);
        }
        let entries = self.grants.entry(resource_id.to_string()).or_default();
        if !entries.contains(&(principal.clone(), access)) {
            entries.push((principal, access));
        }
        Ok(())
    }

    pub fn revoke(&mut self, principal: &Principal, resource_id: &str) {
        if let Some(entries) = self.grants.get_mut(resource_id) {
            entries.retain(|(p, _)| p != principal);
        }
    }

    pub fn add_member(&mut self, login: impl Into<String>, group: impl Into<String>) {
        let group = group.into();
        let groups = self.memberships.entry(login.into()).or_default();
        if !groups.contains(&group) {
            groups.push(group);
        }
    }

    /// Grants declared directly on `resource_id`.
    pub fn grants_on(&self, resource_id: &str) -> Vec<PermissionGrant> {
        self.grants
            .get(resource_id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(p, a)| PermissionGrant::new(p.clone(), resource_id, *a))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All items beneath `id`. Levels deeper than the depth limit are skipped.
    pub fn descendant_items(&self, id: &str) -> Vec<ResourceNode> {
        let mut out = Vec::new();
        let mut stack = vec![(id.to_string(), 0usize)];
        while let Some((current, depth)) = stack.pop() {
            let Some(children) = self.children.get(&current) else {
                continue;
            };
            if depth >= self.max_depth {
                warn!(node = %current, "descendant walk exceeded max depth");
                continue;
            }
            for child_id in children {
                if let Some(child) = self.nodes.get(child_id) {
                    if child.is_item() {
                        out.push(child.clone());
                    } else {
                        stack.push((child_id.clone(), depth + 1));
                    }
                }
            }
        }
        out
    }

    fn applies_to(&self, principal: &Principal, user: &UserIdentity) -> bool {
        match (principal, user) {
            (Principal::Anyone, _) => true,
            (Principal::User(login), UserIdentity::User(caller)) => login == caller,
            (Principal::Group(group), UserIdentity::User(caller)) => self
                .memberships
                .get(caller)
                .is_some_and(|groups| groups.contains(group)),
            (_, UserIdentity::Anonymous) => false,
        }
    }

    /// Check whether `user` holds `level` on `id` or on any ancestor.
    pub fn has_permission(&self, user: &UserIdentity, id: &str, level: AccessLevel) -> bool {
        let mut current = self.nodes.get(id);
        let mut depth = 0;
        while let Some(node) = current {
            if depth > self.max_depth {
                warn!(resource = %id, "permission walk exceeded max depth");
                return false;
            }
            if let Some(entries) = self.grants.get(&node.id) {
                let granted = entries
                    .iter()
                    .any(|(p, access)| access.satisfies(level) && self.applies_to(p, user));
                if granted {
                    return true;
                }
            }
            current = node.parent_id.as_deref().and_then(|pid| self.nodes.get(pid));
            depth += 1;
        }
        false
    }
}

#[async_trait]
impl CatalogAccess for RwLock<CatalogStore> {
    async fn get_node(&self, id: &str) -> Result<Option<ResourceNode>> {
        Ok(self.read().await.get(id).cloned())
    }

    async fn descendant_items(&self, container_id: &str) -> Result<Vec<ResourceNode>> {
        Ok(self.read().await.descendant_items(container_id))
    }
}

#[async_trait]
impl PermissionAccess for RwLock<CatalogStore> {
    async fn has_read_access(&self, user: &UserIdentity, resource_id: &str) -> Result<bool> {
        Ok(self
            .read()
            .await
            .has_permission(user, resource_id, AccessLevel::Read))
    }
}
