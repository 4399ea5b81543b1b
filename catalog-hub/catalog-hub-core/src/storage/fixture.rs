//! JSON snapshot of a catalog, used to seed the in-memory store.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::memory::CatalogStore;
use crate::catalog::ResourceNode;
use crate::permission::PermissionGrant;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogFixture {
    #[serde(default)]
    pub nodes: Vec<ResourceNode>,
    #[serde(default)]
    pub grants: Vec<PermissionGrant>,
    /// Group names keyed by user login.
    #[serde(default)]
    pub memberships: HashMap<String, Vec<String>>,
}

impl CatalogFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog fixture {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("parsing catalog fixture {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Build a store. Nodes may be listed in any order; parents are inserted
    /// before their children.
    pub fn into_store(self, max_depth: usize) -> Result<CatalogStore> {
        let mut store = CatalogStore::new().with_max_depth(max_depth);
        let mut pending = self.nodes;
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for node in pending {
                let ready = match &node.parent_id {
                    None => true,
                    Some(pid) => store.get(pid).is_some(),
                };
                if ready {
                    store.insert(node)?;
                } else {
                    deferred.push(node);
                }
            }
            if deferred.len() == before {
                let ids: Vec<_> = deferred.iter().map(|n| n.id.as_str()).collect();
                bail!("unresolvable parents (missing or cyclic) for: {}", ids.join(", "));
            }
            pending = deferred;
        }
        for grant in self.grants {
            store.grant(grant.principal, &grant.resource_id, grant.access)?;
        }
        for (login, groups) in self.memberships {
            for group in groups {
                store.add_member(login.clone(), group);
            }
        }
        Ok(store)
    }
}

impl CatalogStore {
    /// Load a store from a JSON fixture file.
    pub fn load(path: &Path, max_depth: usize) -> Result<Self> {
        let store = CatalogFixture::load(path)?.into_store(max_depth)?;
        info!(nodes = store.len(), path = %path.display(), "catalog loaded");
        Ok(store)
    }

    /// Export the current contents. Nodes are ordered by id.
    pub fn to_fixture(&self) -> CatalogFixture {
        let mut nodes: Vec<_> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let mut resource_ids: Vec<_> = self.grants.keys().collect();
        resource_ids.sort();
        let grants = resource_ids
            .into_iter()
            .flat_map(|id| self.grants_on(id))
            .collect();
        CatalogFixture {
            nodes,
            grants,
            memberships: self.memberships.clone(),
        }
    }
}
