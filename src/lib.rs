//! Rolegate - Role and permission authorization engine
//!
//! A closed catalog of resources, actions, permissions and roles, a resolver
//! that flattens role and permission inheritance, and a decision procedure
//! answering whether a principal's grants authorize an action on a resource.

pub mod engine;

pub use engine::config::{CatalogSource, ConfigError, EngineConfig};
pub use engine::rbac::{
    Action, Catalog, CatalogDefinition, CatalogError, ClaimError, Enforcer, GrantSet, Permission, Resource, Role,
    TokenClaims,
};
