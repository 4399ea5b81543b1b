//! Grants, caller identities and the authorization filter.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::ResourceNode;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Read,
    Admin,
}

impl AccessLevel {
    /// Whether holding `self` satisfies a request for `wanted`.
    pub fn satisfies(&self, wanted: AccessLevel) -> bool {
        *self == AccessLevel::Admin || wanted == AccessLevel::Read
    }
}

/// Who a grant is given to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    User(String),
    Group(String),
    /// Every caller, anonymous ones included.
    Anyone,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionGrant {
    pub principal: Principal,
    pub resource_id: String,
    pub access: AccessLevel,
}

impl PermissionGrant {
    pub fn new(principal: Principal, resource_id: impl Into<String>, access: AccessLevel) -> Self {
        Self {
            principal,
            resource_id: resource_id.into(),
            access,
        }
    }
}

/// The caller a query runs on behalf of.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UserIdentity {
    Anonymous,
    User(String),
}

impl UserIdentity {
    pub fn user(login: impl Into<String>) -> Self {
        UserIdentity::User(login.into())
    }

    pub fn login(&self) -> Option<&str> {
        match self {
            UserIdentity::Anonymous => None,
            UserIdentity::User(login) => Some(login),
        }
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserIdentity::Anonymous => f.write_str("<anonymous>"),
            UserIdentity::User(login) => f.write_str(login),
        }
    }
}

/// Read access to permission assignments.
#[async_trait]
pub trait PermissionAccess: Send + Sync {
    /// Whether `user` may read `resource_id`, counting grants inherited from
    /// every ancestor container.
    async fn has_read_access(&self, user: &UserIdentity, resource_id: &str) -> Result<bool>;
}

/// Keep the items `user` may read. Every candidate is checked, so callers
/// can count the result without leaking unauthorized items.
pub async fn filter_authorized(
    permissions: &dyn PermissionAccess,
    user: &UserIdentity,
    items: Vec<ResourceNode>,
) -> Result<Vec<ResourceNode>> {
    let mut authorized = Vec::with_capacity(items.len());
    for item in items {
        if permissions.has_read_access(user, &item.id).await? {
            authorized.push(item);
        }
    }
    Ok(authorized)
}
