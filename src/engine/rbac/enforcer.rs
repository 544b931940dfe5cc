//! RBAC Enforcement Layer
//!
//! The decision procedure: given a grant set and an action (plus a resource
//! id for resource-specific actions), answer allow or deny. Every decision is
//! a plain `bool`; unknown actions, missing ids and insufficient grants all
//! come back as `false` and are not told apart.

use std::collections::BTreeSet;
use tracing::trace;

use super::catalog::Catalog;
use super::grant::{encode_resource_claim, GrantSet};
use super::model::{Action, Permission, Role};
use super::resolver;

/// The enforcement engine
#[derive(Debug, Clone, Copy)]
pub struct Enforcer<'a> {
    catalog: &'a Catalog,
}

impl<'a> Enforcer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Decide whether `grants` authorizes `action`, optionally on `resource_id`.
    pub fn is_authorized(&self, grants: &GrantSet, action: Action, resource_id: Option<&str>) -> bool {
        let allowed = self.decide(grants, action, resource_id);
        trace!(%action, resource_id, allowed, "authorization decision");
        allowed
    }

    fn decide(&self, grants: &GrantSet, action: Action, resource_id: Option<&str>) -> bool {
        let Some(details) = self.catalog.action(action) else {
            return false;
        };

        let global_roles = grants.global_role_list();

        if !details.resource_specific {
            return self.role_grants_action(&global_roles, action);
        }

        let Some(resource_id) = resource_id else {
            return false;
        };

        if self.role_grants_action(&global_roles, action) {
            return true;
        }

        let role_match = grants
            .resource_roles
            .iter()
            .filter(|rr| rr.resource_id == resource_id)
            .any(|rr| self.role_grants_action(&[rr.role], action));
        if role_match {
            return true;
        }

        grants
            .resource_permissions
            .iter()
            .filter(|rp| rp.resource_id == resource_id)
            .any(|rp| self.can_perform_action(&[rp.permission], action))
    }

    pub fn role_grants_action(&self, roles: &[Role], action: Action) -> bool {
        resolver::role_grants_action(self.catalog, roles, action)
    }

    pub fn can_perform_action(&self, permissions: &[Permission], action: Action) -> bool {
        resolver::can_perform_action(self.catalog, permissions, action)
    }

    pub fn drill_role_permissions(&self, role: Role) -> BTreeSet<Permission> {
        resolver::drill_role_permissions(self.catalog, role)
    }

    /// Resource ids on which the grant set's scoped roles or permissions
    /// grant `action`, deduplicated in first-seen order. Empty for actions
    /// that are undeclared or not resource-specific, since scoped grants
    /// never authorize those.
    pub fn resources_for_action(&self, grants: &GrantSet, action: Action) -> Vec<String> {
        let mut resources: Vec<String> = Vec::new();
        if !self.catalog.action(action).is_some_and(|details| details.resource_specific) {
            return resources;
        }

        let from_roles = grants
            .resource_roles
            .iter()
            .filter(|rr| self.role_grants_action(&[rr.role], action))
            .map(|rr| &rr.resource_id);
        let from_permissions = grants
            .resource_permissions
            .iter()
            .filter(|rp| self.can_perform_action(&[rp.permission], action))
            .map(|rp| &rp.resource_id);

        for resource_id in from_roles.chain(from_permissions) {
            if !resources.contains(resource_id) {
                resources.push(resource_id.clone());
            }
        }

        resources
    }

    /// Claim strings, any one of which authorizes `action` on `resource_id`.
    ///
    /// Global roles appear as bare tags; resource-scoped roles and directly
    /// held permissions are encoded with the resource id.
    pub fn satisfying_claims(&self, action: Action, resource_id: &str) -> Vec<String> {
        let Some(details) = self.catalog.action(action) else {
            return Vec::new();
        };

        let mut claims = BTreeSet::new();
        for role in self.catalog.roles_granting(action) {
            claims.insert(role.to_string());
            if details.resource_specific {
                claims.insert(encode_resource_claim(resource_id, role.as_str()));
            }
        }
        if details.resource_specific {
            for permission in self.catalog.action_permissions(action) {
                claims.insert(encode_resource_claim(resource_id, permission.as_str()));
            }
        }

        claims.into_iter().collect()
    }
}
