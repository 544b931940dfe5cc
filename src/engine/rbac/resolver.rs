//! Hierarchy Resolver
//!
//! Flattens role and permission inheritance. Traversals keep a visited set,
//! so a cycle simply ends that branch; nothing here can fail.

use std::collections::BTreeSet;

use super::catalog::{Catalog, CatalogDefinition};
use super::model::{Action, Permission, Role};

/// Every permission reachable from `role`.
///
/// Follows the role's own permissions, the roles it also grants, and the
/// permissions those permissions also grant. A role missing from the catalog
/// yields an empty set.
pub fn drill_role_permissions(catalog: &Catalog, role: Role) -> BTreeSet<Permission> {
    drill_permissions_in(catalog.definition(), role)
}

/// The role itself plus every role it transitively also grants.
pub fn drill_roles(catalog: &Catalog, role: Role) -> BTreeSet<Role> {
    drill_roles_in(catalog.definition(), role)
}

/// Every action the role's flattened permissions grant.
pub fn drill_role_actions(catalog: &Catalog, role: Role) -> BTreeSet<Action> {
    drill_role_permissions(catalog, role)
        .into_iter()
        .filter_map(|permission| catalog.permission_actions(permission))
        .flatten()
        .copied()
        .collect()
}

/// True when the two permission lists share at least one member.
pub fn has_suitable_permission(sufficient: &[Permission], has: &BTreeSet<Permission>) -> bool {
    sufficient.iter().any(|permission| has.contains(permission))
}

/// True when any of `roles` grants `action`. Order does not matter.
pub fn role_grants_action(catalog: &Catalog, roles: &[Role], action: Action) -> bool {
    let sufficient = catalog.action_permissions(action);
    if sufficient.is_empty() {
        return false;
    }
    roles
        .iter()
        .any(|role| has_suitable_permission(sufficient, &drill_role_permissions(catalog, *role)))
}

/// True when any of `permissions`, held directly, grants `action`.
pub fn can_perform_action(catalog: &Catalog, permissions: &[Permission], action: Action) -> bool {
    let has: BTreeSet<Permission> = permissions.iter().copied().collect();
    has_suitable_permission(catalog.action_permissions(action), &has)
}

pub(crate) fn drill_roles_in(def: &CatalogDefinition, role: Role) -> BTreeSet<Role> {
    let mut visited = BTreeSet::new();
    let mut pending = vec![role];

    while let Some(current) = pending.pop() {
        let Some(entry) = def.roles.get(&current) else {
            continue;
        };
        if !visited.insert(current) {
            continue;
        }
        pending.extend(entry.also_grants.iter().filter(|r| !visited.contains(*r)));
    }

    visited
}

pub(crate) fn drill_permissions_in(def: &CatalogDefinition, role: Role) -> BTreeSet<Permission> {
    let direct = drill_roles_in(def, role)
        .into_iter()
        .filter_map(|r| def.roles.get(&r))
        .flat_map(|entry| entry.permissions.iter().copied())
        .collect::<Vec<_>>();
    expand_permissions(def, direct)
}

/// Closure of `seeds` under permission also-grants edges.
pub(crate) fn expand_permissions<I>(def: &CatalogDefinition, seeds: I) -> BTreeSet<Permission>
where
    I: IntoIterator<Item = Permission>,
{
    let mut visited = BTreeSet::new();
    let mut pending: Vec<Permission> = seeds.into_iter().collect();

    while let Some(current) = pending.pop() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(entry) = def.permissions.get(&current) {
            pending.extend(entry.also_grants.iter().filter(|p| !visited.contains(*p)));
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rbac::catalog::CatalogDefinition;

    fn catalog() -> Catalog {
        Catalog::build(CatalogDefinition::builtin()).unwrap()
    }

    #[test]
    fn test_drill_follows_role_and_permission_edges() {
        let catalog = catalog();
        let held = drill_role_permissions(&catalog, Role::ProjectContributor);
        assert!(held.contains(&Permission::ProjectDataReadAll));
        // via guest
        assert!(held.contains(&Permission::ProjectDataAdd));
        // via ProjectDataAdd -> ProjectDataReadMine
        assert!(held.contains(&Permission::ProjectDataReadMine));
        assert!(!held.contains(&Permission::ProjectManage));
    }

    #[test]
    fn test_drill_roles_includes_self() {
        let catalog = catalog();
        let roles = drill_roles(&catalog, Role::ProjectManager);
        assert_eq!(
            roles,
            BTreeSet::from([Role::ProjectManager, Role::ProjectContributor, Role::ProjectGuest])
        );
    }

    #[test]
    fn test_unknown_role_drills_to_nothing() {
        let mut def = CatalogDefinition::builtin();
        def.roles.remove(&Role::GeneralUser);
        def.roles
            .get_mut(&Role::GeneralAdmin)
            .unwrap()
            .also_grants
            .retain(|r| *r != Role::GeneralUser);
        // GeneralUser's permissions must stay reachable
        def.roles
            .get_mut(&Role::GeneralCreator)
            .unwrap()
            .permissions
            .extend([Permission::ProjectList, Permission::TemplateView]);
        let catalog = Catalog::build(def).unwrap();

        assert!(drill_role_permissions(&catalog, Role::GeneralUser).is_empty());
        assert!(drill_roles(&catalog, Role::GeneralUser).is_empty());
        assert!(!role_grants_action(&catalog, &[Role::GeneralUser], Action::ListProjects));
    }

    #[test]
    fn test_traversal_tolerates_cycles() {
        // Built without validation: the resolver must still terminate.
        let mut def = CatalogDefinition::builtin();
        def.roles
            .get_mut(&Role::ProjectGuest)
            .unwrap()
            .also_grants
            .push(Role::ProjectAdmin);
        def.permissions
            .get_mut(&Permission::ProjectDataReadMine)
            .unwrap()
            .also_grants
            .push(Permission::ProjectAdmin);

        let roles = drill_roles_in(&def, Role::ProjectGuest);
        assert!(roles.contains(&Role::ProjectAdmin));
        assert!(roles.contains(&Role::ProjectGuest));

        let held = drill_permissions_in(&def, Role::ProjectGuest);
        assert!(held.contains(&Permission::ProjectAdmin));
    }

    #[test]
    fn test_has_suitable_permission() {
        let has = BTreeSet::from([Permission::ProjectView]);
        assert!(has_suitable_permission(&[Permission::ProjectAdmin, Permission::ProjectView], &has));
        assert!(!has_suitable_permission(&[Permission::ProjectAdmin], &has));
        assert!(!has_suitable_permission(&[], &has));
    }

    #[test]
    fn test_can_perform_action_uses_inherited_grants() {
        let catalog = catalog();
        assert!(can_perform_action(&catalog, &[Permission::ProjectAdmin], Action::UpdateProjectDetails));
        assert!(!can_perform_action(&catalog, &[Permission::ProjectDataAdd], Action::DeleteProject));
        assert!(!can_perform_action(&catalog, &[], Action::ReadProjectMetadata));
    }

    #[test]
    fn test_drill_role_actions() {
        let catalog = catalog();
        let actions = drill_role_actions(&catalog, Role::ProjectGuest);
        assert!(actions.contains(&Action::CreateProjectRecord));
        assert!(actions.contains(&Action::ReadMyProjectRecords));
        assert!(!actions.contains(&Action::ReadAllProjectRecords));
    }
}
