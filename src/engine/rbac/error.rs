//! RBAC Error Types
//!
//! Denials are never errors. These cover malformed catalogs, caught when a
//! catalog is built, and malformed claims handed over by the extractor.

use std::io;
use thiserror::Error;

use super::model::{Action, Permission, Resource, Role};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid catalog definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog version {found} is newer than supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Permission {permission} grants undeclared action {action}")]
    UndeclaredAction { permission: Permission, action: Action },

    #[error("{referrer} references undeclared permission {permission}")]
    UndeclaredPermission { referrer: String, permission: Permission },

    #[error("Role {referrer} also grants undeclared role {role}")]
    UndeclaredRole { referrer: Role, role: Role },

    #[error("Permission {permission} lists action {action} more than once")]
    DuplicateAction { permission: Permission, action: Action },

    #[error("Resource {0} has no actions")]
    ResourceWithoutActions(Resource),

    #[error("Action {0} is not granted by any permission")]
    UngrantedAction(Action),

    #[error("Permission {0} is not reachable from any role")]
    UnreachablePermission(Permission),

    #[error("Permission {permission} ({resource}) grants {action} which belongs to {action_resource}")]
    CrossResourceGrant {
        permission: Permission,
        resource: Resource,
        action: Action,
        action_resource: Resource,
    },

    #[error("Role {role} directly grants {action} outside its resource {resource}")]
    ResourceSpecificRoleMismatch {
        role: Role,
        resource: Resource,
        action: Action,
    },

    #[error("Role inheritance cycle: {}", join_path(.0))]
    RoleCycle(Vec<Role>),

    #[error("Permission inheritance cycle: {}", join_path(.0))]
    PermissionCycle(Vec<Permission>),

    #[error("Reverse index out of sync with forward tables: {0}")]
    IndexMismatch(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Malformed resource claim {0:?}: expected '<resourceId>||<tag>' with two non-empty parts")]
    MalformedClaim(String),

    #[error("Unknown {kind} tag: {tag}")]
    UnknownTag { kind: &'static str, tag: String },
}

fn join_path<T: std::fmt::Display>(path: &[T]) -> String {
    path.iter()
        .map(|node| node.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_shows_path() {
        let err = CatalogError::RoleCycle(vec![Role::ProjectGuest, Role::ProjectAdmin, Role::ProjectGuest]);
        assert_eq!(
            err.to_string(),
            "Role inheritance cycle: PROJECT_GUEST -> PROJECT_ADMIN -> PROJECT_GUEST"
        );
    }
}
