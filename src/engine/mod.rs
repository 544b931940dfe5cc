// Rolegate Engine - Core module structure
pub mod cli;
pub mod config;
pub mod rbac;

pub use config::EngineConfig;
pub use rbac::{Catalog, Enforcer, GrantSet};
