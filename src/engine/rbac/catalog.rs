//! Policy Catalog
//!
//! The forward tables (which resource owns each action, what each permission
//! grants, what each role holds) live in a [`CatalogDefinition`]. A
//! [`Catalog`] is a definition that passed validation, together with the
//! reverse indices the decision procedure reads. Catalogs are built once and
//! never mutated, so a `&Catalog` can be shared across threads freely.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::error::{CatalogError, Result};
use super::model::{Action, Permission, Resource, Role};
use super::resolver;

/// Current catalog definition schema version
pub const CATALOG_VERSION: u32 = 1;

/// Ownership and instance requirement of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEntry {
    pub resource: Resource,
    pub resource_specific: bool,
}

/// What a permission grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionEntry {
    pub resource: Resource,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub also_grants: Vec<Permission>,
}

/// What a role holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleEntry {
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub also_grants: Vec<Role>,
}

/// The declarative forward tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDefinition {
    /// Schema version for compatibility
    pub version: u32,
    pub actions: BTreeMap<Action, ActionEntry>,
    pub permissions: BTreeMap<Permission, PermissionEntry>,
    pub roles: BTreeMap<Role, RoleEntry>,
}

impl CatalogDefinition {
    /// The policy compiled into the application
    pub fn builtin() -> Self {
        use Action::*;

        let mut def = Self {
            version: CATALOG_VERSION,
            actions: BTreeMap::new(),
            permissions: BTreeMap::new(),
            roles: BTreeMap::new(),
        };

        for action in [ListProjects, CreateProject] {
            def.declare_action(action, Resource::Project, false);
        }
        for action in [
            ReadProjectMetadata,
            UpdateProjectDetails,
            UpdateProjectUiSpec,
            ReadMyProjectRecords,
            ReadAllProjectRecords,
            CreateProjectRecord,
            EditMyProjectRecords,
            EditAllProjectRecords,
            DeleteMyProjectRecords,
            DeleteAllProjectRecords,
            ChangeProjectStatus,
            DeleteProject,
            ExportProjectData,
            GenerateRandomProjectRecords,
            ViewProjectInvites,
            CreateGuestProjectInvite,
            EditGuestProjectInvite,
            DeleteGuestProjectInvite,
            CreateContributorProjectInvite,
            EditContributorProjectInvite,
            DeleteContributorProjectInvite,
            CreateManagerProjectInvite,
            EditManagerProjectInvite,
            DeleteManagerProjectInvite,
            CreateAdminProjectInvite,
            EditAdminProjectInvite,
            DeleteAdminProjectInvite,
            ViewProjectUsers,
            AddAdminToProject,
            RemoveAdminFromProject,
            AddManagerToProject,
            RemoveManagerFromProject,
            AddContributorToProject,
            RemoveContributorFromProject,
            AddGuestToProject,
            RemoveGuestFromProject,
        ] {
            def.declare_action(action, Resource::Project, true);
        }
        for action in [ViewTemplates, CreateTemplate] {
            def.declare_action(action, Resource::Template, false);
        }
        for action in [UpdateTemplateContent, UpdateTemplateDetails, ChangeTemplateStatus, DeleteTemplate] {
            def.declare_action(action, Resource::Template, true);
        }
        def.declare_action(ViewUserList, Resource::User, false);
        for action in [AddOrRemoveGlobalUserRole, ResetUserPassword, DeleteUser] {
            def.declare_action(action, Resource::User, true);
        }
        for action in [InitialiseSystemApi, ValidateDbs, RestoreFromBackup] {
            def.declare_action(action, Resource::System, false);
        }

        // Project permissions
        def.grant(Permission::ProjectList, Resource::Project, &[ListProjects], &[]);
        def.grant(Permission::ProjectCreate, Resource::Project, &[CreateProject], &[]);
        def.grant(Permission::ProjectView, Resource::Project, &[ReadProjectMetadata], &[]);
        def.grant(Permission::ProjectDataReadMine, Resource::Project, &[ReadMyProjectRecords], &[]);
        def.grant(
            Permission::ProjectDataAdd,
            Resource::Project,
            &[CreateProjectRecord, EditMyProjectRecords, DeleteMyProjectRecords],
            &[Permission::ProjectDataReadMine],
        );
        def.grant(
            Permission::ProjectDataReadAll,
            Resource::Project,
            &[ReadAllProjectRecords],
            &[Permission::ProjectDataReadMine],
        );
        def.grant(
            Permission::ProjectDataEditAll,
            Resource::Project,
            &[EditMyProjectRecords, EditAllProjectRecords],
            &[],
        );
        def.grant(
            Permission::ProjectDataDeleteAll,
            Resource::Project,
            &[DeleteMyProjectRecords, DeleteAllProjectRecords],
            &[],
        );
        def.grant(
            Permission::ProjectManage,
            Resource::Project,
            &[
                UpdateProjectDetails,
                UpdateProjectUiSpec,
                ChangeProjectStatus,
                ExportProjectData,
                ViewProjectInvites,
                CreateGuestProjectInvite,
                EditGuestProjectInvite,
                DeleteGuestProjectInvite,
                CreateContributorProjectInvite,
                EditContributorProjectInvite,
                DeleteContributorProjectInvite,
                CreateManagerProjectInvite,
                EditManagerProjectInvite,
                DeleteManagerProjectInvite,
                ViewProjectUsers,
                AddGuestToProject,
                RemoveGuestFromProject,
                AddContributorToProject,
                RemoveContributorFromProject,
                AddManagerToProject,
                RemoveManagerFromProject,
            ],
            &[
                Permission::ProjectView,
                Permission::ProjectDataReadAll,
                Permission::ProjectDataEditAll,
                Permission::ProjectDataDeleteAll,
            ],
        );
        def.grant(
            Permission::ProjectAdmin,
            Resource::Project,
            &[
                CreateAdminProjectInvite,
                EditAdminProjectInvite,
                DeleteAdminProjectInvite,
                DeleteProject,
                AddAdminToProject,
                RemoveAdminFromProject,
                GenerateRandomProjectRecords,
            ],
            &[Permission::ProjectManage],
        );

        // Template permissions
        def.grant(Permission::TemplateView, Resource::Template, &[ViewTemplates], &[]);
        def.grant(Permission::TemplateCreate, Resource::Template, &[CreateTemplate], &[]);
        def.grant(
            Permission::TemplateEdit,
            Resource::Template,
            &[UpdateTemplateContent, UpdateTemplateDetails, ChangeTemplateStatus],
            &[],
        );
        def.grant(Permission::TemplateDelete, Resource::Template, &[DeleteTemplate], &[]);

        // User and system permissions
        def.grant(
            Permission::UserManage,
            Resource::User,
            &[ViewUserList, AddOrRemoveGlobalUserRole, ResetUserPassword, DeleteUser],
            &[],
        );
        def.grant(
            Permission::SystemManage,
            Resource::System,
            &[InitialiseSystemApi, ValidateDbs, RestoreFromBackup],
            &[],
        );

        // Project roles
        def.assign(
            Role::ProjectGuest,
            &[Permission::ProjectView, Permission::ProjectDataAdd],
            &[],
        );
        def.assign(
            Role::ProjectContributor,
            &[
                Permission::ProjectDataReadAll,
                Permission::ProjectDataEditAll,
                Permission::ProjectDataDeleteAll,
            ],
            &[Role::ProjectGuest],
        );
        def.assign(Role::ProjectManager, &[Permission::ProjectManage], &[Role::ProjectContributor]);
        def.assign(Role::ProjectAdmin, &[Permission::ProjectAdmin], &[Role::ProjectManager]);

        // Global roles
        def.assign(
            Role::GeneralUser,
            &[Permission::ProjectList, Permission::TemplateView],
            &[],
        );
        def.assign(
            Role::GeneralCreator,
            &[
                Permission::ProjectCreate,
                Permission::TemplateCreate,
                Permission::TemplateEdit,
                Permission::TemplateDelete,
            ],
            &[],
        );
        def.assign(
            Role::GeneralAdmin,
            &[Permission::UserManage, Permission::SystemManage],
            &[Role::GeneralUser, Role::GeneralCreator, Role::ProjectAdmin],
        );

        def
    }

    /// Load a definition from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let def: CatalogDefinition = serde_json::from_str(&content)?;

        if def.version > CATALOG_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: def.version,
                supported: CATALOG_VERSION,
            });
        }

        Ok(def)
    }

    /// Save a definition as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn declare_action(&mut self, action: Action, resource: Resource, resource_specific: bool) {
        self.actions.insert(action, ActionEntry { resource, resource_specific });
    }

    pub fn grant(
        &mut self,
        permission: Permission,
        resource: Resource,
        actions: &[Action],
        also_grants: &[Permission],
    ) {
        self.permissions.insert(
            permission,
            PermissionEntry {
                resource,
                actions: actions.to_vec(),
                also_grants: also_grants.to_vec(),
            },
        );
    }

    pub fn assign(&mut self, role: Role, permissions: &[Permission], also_grants: &[Role]) {
        self.roles.insert(
            role,
            RoleEntry {
                permissions: permissions.to_vec(),
                also_grants: also_grants.to_vec(),
            },
        );
    }
}

/// A validated definition plus its reverse indices
#[derive(Debug, Clone)]
pub struct Catalog {
    definition: CatalogDefinition,
    /// Actions each permission grants, directly or through inheritance
    permission_actions: BTreeMap<Permission, BTreeSet<Action>>,
    action_permissions: BTreeMap<Action, Vec<Permission>>,
    resource_actions: BTreeMap<Resource, Vec<Action>>,
    action_roles: BTreeMap<Action, Vec<Role>>,
    fingerprint: String,
}

static SHARED: Lazy<Result<Catalog>> = Lazy::new(|| Catalog::build(CatalogDefinition::builtin()));

impl Catalog {
    /// Validate a definition and derive the reverse indices.
    ///
    /// Every structural fault is reported here, before any decision is made:
    /// dangling references, duplicate actions, inheritance cycles, actions
    /// leaking across resources, and coverage gaps.
    pub fn build(definition: CatalogDefinition) -> Result<Self> {
        if definition.version > CATALOG_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: definition.version,
                supported: CATALOG_VERSION,
            });
        }

        check_references(&definition)?;
        check_duplicates(&definition)?;
        check_role_cycles(&definition)?;
        check_permission_cycles(&definition)?;

        for resource in Resource::ALL {
            if !definition.actions.values().any(|entry| entry.resource == *resource) {
                return Err(CatalogError::ResourceWithoutActions(*resource));
            }
        }

        let permission_actions: BTreeMap<Permission, BTreeSet<Action>> = definition
            .permissions
            .keys()
            .map(|permission| {
                let actions = resolver::expand_permissions(&definition, [*permission])
                    .iter()
                    .filter_map(|p| definition.permissions.get(p))
                    .flat_map(|entry| entry.actions.iter().copied())
                    .collect();
                (*permission, actions)
            })
            .collect();

        check_resource_isolation(&definition, &permission_actions)?;
        check_role_resources(&definition)?;

        for action in definition.actions.keys() {
            if !permission_actions.values().any(|actions| actions.contains(action)) {
                return Err(CatalogError::UngrantedAction(*action));
            }
        }

        let role_permissions: BTreeMap<Role, BTreeSet<Permission>> = definition
            .roles
            .keys()
            .map(|role| (*role, resolver::drill_permissions_in(&definition, *role)))
            .collect();

        for permission in definition.permissions.keys() {
            if !role_permissions.values().any(|held| held.contains(permission)) {
                return Err(CatalogError::UnreachablePermission(*permission));
            }
        }

        let mut action_permissions: BTreeMap<Action, Vec<Permission>> = BTreeMap::new();
        for (permission, actions) in &permission_actions {
            for action in actions {
                action_permissions.entry(*action).or_default().push(*permission);
            }
        }

        let mut resource_actions: BTreeMap<Resource, Vec<Action>> = BTreeMap::new();
        for (action, entry) in &definition.actions {
            resource_actions.entry(entry.resource).or_default().push(*action);
        }

        let mut action_roles: BTreeMap<Action, Vec<Role>> = BTreeMap::new();
        for (role, held) in &role_permissions {
            for action in held.iter().filter_map(|p| permission_actions.get(p)).flatten() {
                let roles = action_roles.entry(*action).or_default();
                if !roles.contains(role) {
                    roles.push(*role);
                }
            }
        }

        let fingerprint = hex::encode(Sha256::digest(serde_json::to_vec(&definition)?));

        let catalog = Self {
            definition,
            permission_actions,
            action_permissions,
            resource_actions,
            action_roles,
            fingerprint,
        };
        catalog.verify_indices()?;

        debug!(
            actions = catalog.definition.actions.len(),
            permissions = catalog.definition.permissions.len(),
            roles = catalog.definition.roles.len(),
            fingerprint = %catalog.fingerprint,
            "catalog built"
        );

        Ok(catalog)
    }

    /// The builtin catalog, built on first use and shared for the process
    pub fn shared() -> std::result::Result<&'static Catalog, &'static CatalogError> {
        SHARED.as_ref()
    }

    pub fn definition(&self) -> &CatalogDefinition {
        &self.definition
    }

    pub fn action(&self, action: Action) -> Option<&ActionEntry> {
        self.definition.actions.get(&action)
    }

    /// Permissions whose direct or inherited grant includes `action`
    pub fn action_permissions(&self, action: Action) -> &[Permission] {
        self.action_permissions
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn resource_actions(&self, resource: Resource) -> &[Action] {
        self.resource_actions
            .get(&resource)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Roles whose flattened permissions grant `action`
    pub fn roles_granting(&self, action: Action) -> &[Role] {
        self.action_roles
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Actions a permission grants, including inherited ones
    pub fn permission_actions(&self, permission: Permission) -> Option<&BTreeSet<Action>> {
        self.permission_actions.get(&permission)
    }

    /// Resource-scoped roles bound to a resource kind
    pub fn resource_roles(&self, resource: Resource) -> Vec<Role> {
        self.definition
            .roles
            .keys()
            .copied()
            .filter(|role| role.resource() == Some(resource))
            .collect()
    }

    /// SHA-256 of the canonical JSON definition, hex encoded
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Cross-check each reverse index against the forward tables.
    fn verify_indices(&self) -> Result<()> {
        for action in self.definition.actions.keys() {
            let expected: BTreeSet<Permission> = self
                .permission_actions
                .iter()
                .filter(|(_, actions)| actions.contains(action))
                .map(|(permission, _)| *permission)
                .collect();
            let indexed = self.action_permissions(*action);
            let indexed_set: BTreeSet<Permission> = indexed.iter().copied().collect();
            if indexed_set != expected || indexed_set.len() != indexed.len() {
                return Err(CatalogError::IndexMismatch(format!(
                    "permissions for {action}"
                )));
            }
        }

        for resource in Resource::ALL {
            let expected: BTreeSet<Action> = self
                .definition
                .actions
                .iter()
                .filter(|(_, entry)| entry.resource == *resource)
                .map(|(action, _)| *action)
                .collect();
            let indexed = self.resource_actions(*resource);
            let indexed_set: BTreeSet<Action> = indexed.iter().copied().collect();
            if indexed_set != expected || indexed_set.len() != indexed.len() {
                return Err(CatalogError::IndexMismatch(format!(
                    "actions for {resource}"
                )));
            }
        }

        Ok(())
    }
}

fn check_references(def: &CatalogDefinition) -> Result<()> {
    for (permission, entry) in &def.permissions {
        if let Some(action) = entry.actions.iter().find(|a| !def.actions.contains_key(a)) {
            return Err(CatalogError::UndeclaredAction {
                permission: *permission,
                action: *action,
            });
        }
        if let Some(missing) = entry.also_grants.iter().find(|p| !def.permissions.contains_key(p)) {
            return Err(CatalogError::UndeclaredPermission {
                referrer: format!("Permission {permission}"),
                permission: *missing,
            });
        }
    }

    for (role, entry) in &def.roles {
        if let Some(missing) = entry.permissions.iter().find(|p| !def.permissions.contains_key(p)) {
            return Err(CatalogError::UndeclaredPermission {
                referrer: format!("Role {role}"),
                permission: *missing,
            });
        }
        if let Some(missing) = entry.also_grants.iter().find(|r| !def.roles.contains_key(r)) {
            return Err(CatalogError::UndeclaredRole {
                referrer: *role,
                role: *missing,
            });
        }
    }

    Ok(())
}

fn check_duplicates(def: &CatalogDefinition) -> Result<()> {
    for (permission, entry) in &def.permissions {
        let mut seen = BTreeSet::new();
        for action in &entry.actions {
            if !seen.insert(*action) {
                return Err(CatalogError::DuplicateAction {
                    permission: *permission,
                    action: *action,
                });
            }
        }
    }
    Ok(())
}

fn check_role_cycles(def: &CatalogDefinition) -> Result<()> {
    let edges = |role: &Role| {
        def.roles
            .get(role)
            .map(|entry| entry.also_grants.clone())
            .unwrap_or_default()
    };
    match find_cycle(def.roles.keys().copied(), edges) {
        Some(path) => Err(CatalogError::RoleCycle(path)),
        None => Ok(()),
    }
}

fn check_permission_cycles(def: &CatalogDefinition) -> Result<()> {
    let edges = |permission: &Permission| {
        def.permissions
            .get(permission)
            .map(|entry| entry.also_grants.clone())
            .unwrap_or_default()
    };
    match find_cycle(def.permissions.keys().copied(), edges) {
        Some(path) => Err(CatalogError::PermissionCycle(path)),
        None => Ok(()),
    }
}

/// Depth-first search for a back edge; returns the cycle as a closed path.
fn find_cycle<N, I, E>(nodes: I, edges: E) -> Option<Vec<N>>
where
    N: Copy + Ord,
    I: IntoIterator<Item = N>,
    E: Fn(&N) -> Vec<N>,
{
    let mut done = BTreeSet::new();

    for start in nodes {
        if done.contains(&start) {
            continue;
        }

        // (node, next child index); `path` mirrors the stack
        let mut stack: Vec<(N, usize)> = vec![(start, 0)];
        let mut path: Vec<N> = vec![start];

        while let Some((node, next)) = stack.last().copied() {
            let children = edges(&node);
            if next >= children.len() {
                stack.pop();
                path.pop();
                done.insert(node);
                continue;
            }
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            let child = children[next];
            if let Some(pos) = path.iter().position(|n| *n == child) {
                let mut cycle = path[pos..].to_vec();
                cycle.push(child);
                return Some(cycle);
            }
            if !done.contains(&child) {
                stack.push((child, 0));
                path.push(child);
            }
        }
    }

    None
}

fn check_resource_isolation(
    def: &CatalogDefinition,
    permission_actions: &BTreeMap<Permission, BTreeSet<Action>>,
) -> Result<()> {
    for (permission, actions) in permission_actions {
        let Some(entry) = def.permissions.get(permission) else {
            continue;
        };
        for action in actions {
            if let Some(owner) = def.actions.get(action) {
                if owner.resource != entry.resource {
                    return Err(CatalogError::CrossResourceGrant {
                        permission: *permission,
                        resource: entry.resource,
                        action: *action,
                        action_resource: owner.resource,
                    });
                }
            }
        }
    }
    Ok(())
}

/// A resource-scoped role may only directly grant actions on its own resource.
fn check_role_resources(def: &CatalogDefinition) -> Result<()> {
    for (role, entry) in &def.roles {
        let Some(resource) = role.resource() else {
            continue;
        };
        let direct = entry
            .permissions
            .iter()
            .filter_map(|p| def.permissions.get(p))
            .flat_map(|p| p.actions.iter());
        for action in direct {
            if let Some(owner) = def.actions.get(action) {
                if owner.resource != resource {
                    return Err(CatalogError::ResourceSpecificRoleMismatch {
                        role: *role,
                        resource,
                        action: *action,
                    });
                }
            }
        }
    }
    Ok(())
}
