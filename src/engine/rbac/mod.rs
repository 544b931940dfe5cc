//! RBAC Module
//!
//! Role/permission authorization: a validated policy catalog, a hierarchy
//! resolver and the decision procedure over a principal's grant set.

pub mod catalog;
pub mod enforcer;
pub mod error;
pub mod grant;
pub mod model;
pub mod resolver;

pub use catalog::{ActionEntry, Catalog, CatalogDefinition, PermissionEntry, RoleEntry, CATALOG_VERSION};
pub use enforcer::Enforcer;
pub use error::{CatalogError, ClaimError};
pub use grant::{GrantSet, ResourcePermission, ResourceRole, TokenClaims, CLAIM_SEPARATOR};
pub use model::{Action, InviteOp, Permission, Resource, Role, RoleScope};
pub use resolver::{
    can_perform_action, drill_role_actions, drill_role_permissions, drill_roles,
    has_suitable_permission, role_grants_action,
};
