use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthType {
    Microservice,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ViewPermitTransaction,
}

/// Identity of the caller, passed explicitly into every orchestrator call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallerContext {
    pub user_id: Option<u64>,
    pub scope: AuthType,
    pub permissions: HashSet<Permission>,
}

impl CallerContext {
    pub fn user(user_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn microservice() -> Self {
        Self {
            scope: AuthType::Microservice,
            ..Self::default()
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    /// True when the caller holds `scope` or `permission`; either one is enough.
    pub fn allows(&self, scope: AuthType, permission: Permission) -> bool {
        self.scope == scope || self.permissions.contains(&permission)
    }
}
