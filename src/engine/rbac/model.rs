//! RBAC Vocabulary
//!
//! Closed enumerations for resources, actions, permissions and roles, with
//! their stable wire tags and human-readable metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ClaimError;

/// Declares a closed vocabulary: the enum, its `ALL` listing and its
/// `SCREAMING_SNAKE_CASE` tag in both directions.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $tag:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $tag)] $variant,)+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Stable tag used in claims and definition files.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ClaimError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    other => Err(ClaimError::UnknownTag {
                        kind: stringify!($name),
                        tag: other.to_string(),
                    }),
                }
            }
        }
    };
}

vocabulary! {
    /// Kinds of protected object.
    pub enum Resource {
        Project => "PROJECT",
        Template => "TEMPLATE",
        User => "USER",
        System => "SYSTEM",
    }
}

vocabulary! {
    /// Operations a principal may attempt.
    pub enum Action {
        // Project
        ListProjects => "LIST_PROJECTS",
        CreateProject => "CREATE_PROJECT",
        ReadProjectMetadata => "READ_PROJECT_METADATA",
        UpdateProjectDetails => "UPDATE_PROJECT_DETAILS",
        UpdateProjectUiSpec => "UPDATE_PROJECT_UISPEC",
        ReadMyProjectRecords => "READ_MY_PROJECT_RECORDS",
        ReadAllProjectRecords => "READ_ALL_PROJECT_RECORDS",
        CreateProjectRecord => "CREATE_PROJECT_RECORD",
        EditMyProjectRecords => "EDIT_MY_PROJECT_RECORDS",
        EditAllProjectRecords => "EDIT_ALL_PROJECT_RECORDS",
        DeleteMyProjectRecords => "DELETE_MY_PROJECT_RECORDS",
        DeleteAllProjectRecords => "DELETE_ALL_PROJECT_RECORDS",
        ChangeProjectStatus => "CHANGE_PROJECT_STATUS",
        DeleteProject => "DELETE_PROJECT",
        ExportProjectData => "EXPORT_PROJECT_DATA",
        GenerateRandomProjectRecords => "GENERATE_RANDOM_PROJECT_RECORDS",
        ViewProjectInvites => "VIEW_PROJECT_INVITES",
        CreateGuestProjectInvite => "CREATE_GUEST_PROJECT_INVITE",
        EditGuestProjectInvite => "EDIT_GUEST_PROJECT_INVITE",
        DeleteGuestProjectInvite => "DELETE_GUEST_PROJECT_INVITE",
        CreateContributorProjectInvite => "CREATE_CONTRIBUTOR_PROJECT_INVITE",
        EditContributorProjectInvite => "EDIT_CONTRIBUTOR_PROJECT_INVITE",
        DeleteContributorProjectInvite => "DELETE_CONTRIBUTOR_PROJECT_INVITE",
        CreateManagerProjectInvite => "CREATE_MANAGER_PROJECT_INVITE",
        EditManagerProjectInvite => "EDIT_MANAGER_PROJECT_INVITE",
        DeleteManagerProjectInvite => "DELETE_MANAGER_PROJECT_INVITE",
        CreateAdminProjectInvite => "CREATE_ADMIN_PROJECT_INVITE",
        EditAdminProjectInvite => "EDIT_ADMIN_PROJECT_INVITE",
        DeleteAdminProjectInvite => "DELETE_ADMIN_PROJECT_INVITE",
        ViewProjectUsers => "VIEW_PROJECT_USERS",
        AddAdminToProject => "ADD_ADMIN_TO_PROJECT",
        RemoveAdminFromProject => "REMOVE_ADMIN_FROM_PROJECT",
        AddManagerToProject => "ADD_MANAGER_TO_PROJECT",
        RemoveManagerFromProject => "REMOVE_MANAGER_FROM_PROJECT",
        AddContributorToProject => "ADD_CONTRIBUTOR_TO_PROJECT",
        RemoveContributorFromProject => "REMOVE_CONTRIBUTOR_FROM_PROJECT",
        AddGuestToProject => "ADD_GUEST_TO_PROJECT",
        RemoveGuestFromProject => "REMOVE_GUEST_FROM_PROJECT",
        // Template
        ViewTemplates => "VIEW_TEMPLATES",
        CreateTemplate => "CREATE_TEMPLATE",
        UpdateTemplateContent => "UPDATE_TEMPLATE_CONTENT",
        UpdateTemplateDetails => "UPDATE_TEMPLATE_DETAILS",
        ChangeTemplateStatus => "CHANGE_TEMPLATE_STATUS",
        DeleteTemplate => "DELETE_TEMPLATE",
        // User
        ViewUserList => "VIEW_USER_LIST",
        AddOrRemoveGlobalUserRole => "ADD_OR_REMOVE_GLOBAL_USER_ROLE",
        ResetUserPassword => "RESET_USER_PASSWORD",
        DeleteUser => "DELETE_USER",
        // System
        InitialiseSystemApi => "INITIALISE_SYSTEM_API",
        ValidateDbs => "VALIDATE_DBS",
        RestoreFromBackup => "RESTORE_FROM_BACKUP",
    }
}

vocabulary! {
    /// Capability bundles, each scoped to one resource kind.
    pub enum Permission {
        ProjectList => "PROJECT_LIST",
        ProjectCreate => "PROJECT_CREATE",
        ProjectView => "PROJECT_VIEW",
        ProjectDataAdd => "PROJECT_DATA_ADD",
        ProjectDataReadMine => "PROJECT_DATA_READ_MINE",
        ProjectDataReadAll => "PROJECT_DATA_READ_ALL",
        ProjectDataEditAll => "PROJECT_DATA_EDIT_ALL",
        ProjectDataDeleteAll => "PROJECT_DATA_DELETE_ALL",
        ProjectManage => "PROJECT_MANAGE",
        ProjectAdmin => "PROJECT_ADMIN",
        TemplateView => "TEMPLATE_VIEW",
        TemplateCreate => "TEMPLATE_CREATE",
        TemplateEdit => "TEMPLATE_EDIT",
        TemplateDelete => "TEMPLATE_DELETE",
        UserManage => "USER_MANAGE",
        SystemManage => "SYSTEM_MANAGE",
    }
}

vocabulary! {
    /// Named bundles of permissions assigned to principals.
    pub enum Role {
        GeneralUser => "GENERAL_USER",
        GeneralAdmin => "GENERAL_ADMIN",
        GeneralCreator => "GENERAL_CREATOR",
        ProjectGuest => "PROJECT_GUEST",
        ProjectContributor => "PROJECT_CONTRIBUTOR",
        ProjectManager => "PROJECT_MANAGER",
        ProjectAdmin => "PROJECT_ADMIN",
    }
}

/// Where a role applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Applies to every instance of every resource kind
    Global,
    /// Must be assigned per resource instance
    ResourceSpecific,
}

/// Invitation operations, one action per role level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InviteOp {
    Create,
    Edit,
    Delete,
}

impl Action {
    /// Display name
    pub const fn name(self) -> &'static str {
        use Action::*;
        match self {
            ListProjects => "List Projects",
            CreateProject => "Create Project",
            ReadProjectMetadata => "Read Project Metadata",
            UpdateProjectDetails => "Update Project Details",
            UpdateProjectUiSpec => "Update Project UI Specification",
            ReadMyProjectRecords => "Read My Project Records",
            ReadAllProjectRecords => "Read All Project Records",
            CreateProjectRecord => "Create Project Record",
            EditMyProjectRecords => "Edit My Project Records",
            EditAllProjectRecords => "Edit All Project Records",
            DeleteMyProjectRecords => "Delete My Project Records",
            DeleteAllProjectRecords => "Delete All Project Records",
            ChangeProjectStatus => "Change Project Status",
            DeleteProject => "Delete Project",
            ExportProjectData => "Export Project Data",
            GenerateRandomProjectRecords => "Generate Random Project Records",
            ViewProjectInvites => "View Project Invitations",
            CreateGuestProjectInvite => "Create Guest Project Invite",
            EditGuestProjectInvite => "Edit Guest Project Invite",
            DeleteGuestProjectInvite => "Delete Guest Project Invite",
            CreateContributorProjectInvite => "Create Contributor Project Invite",
            EditContributorProjectInvite => "Edit Contributor Project Invite",
            DeleteContributorProjectInvite => "Delete Contributor Project Invite",
            CreateManagerProjectInvite => "Create Manager Project Invite",
            EditManagerProjectInvite => "Edit Manager Project Invite",
            DeleteManagerProjectInvite => "Delete Manager Project Invite",
            CreateAdminProjectInvite => "Create Admin Project Invite",
            EditAdminProjectInvite => "Edit Admin Project Invite",
            DeleteAdminProjectInvite => "Delete Admin Project Invite",
            ViewProjectUsers => "View Project Users",
            AddAdminToProject => "Add Admin to Project",
            RemoveAdminFromProject => "Remove Admin from Project",
            AddManagerToProject => "Add Manager to Project",
            RemoveManagerFromProject => "Remove Manager from Project",
            AddContributorToProject => "Add Contributor to Project",
            RemoveContributorFromProject => "Remove Contributor from Project",
            AddGuestToProject => "Add Guest to Project",
            RemoveGuestFromProject => "Remove Guest from Project",
            ViewTemplates => "View Templates",
            CreateTemplate => "Create Template",
            UpdateTemplateContent => "Update Template Content",
            UpdateTemplateDetails => "Update Template Details",
            ChangeTemplateStatus => "Change Template Status",
            DeleteTemplate => "Delete Template",
            ViewUserList => "View User List",
            AddOrRemoveGlobalUserRole => "Manage Global User Roles",
            ResetUserPassword => "Reset User Password",
            DeleteUser => "Delete User",
            InitialiseSystemApi => "Initialise System API",
            ValidateDbs => "Validate System Databases",
            RestoreFromBackup => "Restore From Backup",
        }
    }

    /// One-line description
    pub const fn description(self) -> &'static str {
        use Action::*;
        match self {
            ListProjects => "List high level details of all projects",
            CreateProject => "Create a new project",
            ReadProjectMetadata => "View the title, description and other high level details of a project",
            UpdateProjectDetails => "Modify the title, description and other high level details of a project",
            UpdateProjectUiSpec => "Modify the UI specification of a project",
            ReadMyProjectRecords => "View records in a project created by the current user",
            ReadAllProjectRecords => "View all records in a project, including other users' records",
            CreateProjectRecord => "Add a new record to a project",
            EditMyProjectRecords => "Modify records in a project created by the current user",
            EditAllProjectRecords => "Modify any record in a project",
            DeleteMyProjectRecords => "Remove records from a project created by the current user",
            DeleteAllProjectRecords => "Remove any record from a project",
            ChangeProjectStatus => "Open or close a project",
            DeleteProject => "Permanently remove a project",
            ExportProjectData => "Export all data associated with a project",
            GenerateRandomProjectRecords => "Generate random records for debugging",
            ViewProjectInvites => "View existing invitations to a project",
            CreateGuestProjectInvite => "Create an invitation granting guest access",
            EditGuestProjectInvite => "Modify a guest invitation",
            DeleteGuestProjectInvite => "Remove a guest invitation",
            CreateContributorProjectInvite => "Create an invitation granting contributor access",
            EditContributorProjectInvite => "Modify a contributor invitation",
            DeleteContributorProjectInvite => "Remove a contributor invitation",
            CreateManagerProjectInvite => "Create an invitation granting manager access",
            EditManagerProjectInvite => "Modify a manager invitation",
            DeleteManagerProjectInvite => "Remove a manager invitation",
            CreateAdminProjectInvite => "Create an invitation granting admin access",
            EditAdminProjectInvite => "Modify an admin invitation",
            DeleteAdminProjectInvite => "Remove an admin invitation",
            ViewProjectUsers => "View the users of a project and their roles",
            AddAdminToProject => "Grant a user admin access to a project",
            RemoveAdminFromProject => "Revoke a user's admin access to a project",
            AddManagerToProject => "Grant a user manager access to a project",
            RemoveManagerFromProject => "Revoke a user's manager access to a project",
            AddContributorToProject => "Grant a user contributor access to a project",
            RemoveContributorFromProject => "Revoke a user's contributor access to a project",
            AddGuestToProject => "Grant a user guest access to a project",
            RemoveGuestFromProject => "Revoke a user's guest access to a project",
            ViewTemplates => "View all templates",
            CreateTemplate => "Create a new template",
            UpdateTemplateContent => "Modify the specification of a template",
            UpdateTemplateDetails => "Modify the name, description and other details of a template",
            ChangeTemplateStatus => "Change the status of a template",
            DeleteTemplate => "Permanently remove a template",
            ViewUserList => "List the users of the system",
            AddOrRemoveGlobalUserRole => "Add or remove global roles on a user",
            ResetUserPassword => "Generate a password reset link for a user",
            DeleteUser => "Permanently remove a user",
            InitialiseSystemApi => "Run system initialisation such as migrations and key setup",
            ValidateDbs => "Run the database validation process",
            RestoreFromBackup => "Restore databases from a backup",
        }
    }
}

impl Role {
    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            Role::GeneralUser => "General User",
            Role::GeneralAdmin => "System Administrator",
            Role::GeneralCreator => "Content Creator",
            Role::ProjectGuest => "Project Guest",
            Role::ProjectContributor => "Project Contributor",
            Role::ProjectManager => "Project Manager",
            Role::ProjectAdmin => "Project Administrator",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Role::GeneralUser => "Default permissions held by every registered user",
            Role::GeneralAdmin => "Full access to all system resources and management capabilities",
            Role::GeneralCreator => "Create and manage templates and projects across the system",
            Role::ProjectGuest => "View the project and work only with their own records",
            Role::ProjectContributor => "View all data within a project and contribute their own",
            Role::ProjectManager => "Manage project settings, invitations and all project data",
            Role::ProjectAdmin => "Full control over a project, including deletion and admin management",
        }
    }

    /// Resource kind a resource-scoped role is bound to
    pub const fn resource(self) -> Option<Resource> {
        match self {
            Role::ProjectGuest
            | Role::ProjectContributor
            | Role::ProjectManager
            | Role::ProjectAdmin => Some(Resource::Project),
            Role::GeneralUser | Role::GeneralAdmin | Role::GeneralCreator => None,
        }
    }

    pub const fn scope(self) -> RoleScope {
        match self.resource() {
            Some(_) => RoleScope::ResourceSpecific,
            None => RoleScope::Global,
        }
    }

    /// Action guarding adding (or removing) this role on a project.
    pub const fn membership_action(self, add: bool) -> Option<Action> {
        let action = match (self, add) {
            (Role::ProjectAdmin, true) => Action::AddAdminToProject,
            (Role::ProjectAdmin, false) => Action::RemoveAdminFromProject,
            (Role::ProjectManager, true) => Action::AddManagerToProject,
            (Role::ProjectManager, false) => Action::RemoveManagerFromProject,
            (Role::ProjectContributor, true) => Action::AddContributorToProject,
            (Role::ProjectContributor, false) => Action::RemoveContributorFromProject,
            (Role::ProjectGuest, true) => Action::AddGuestToProject,
            (Role::ProjectGuest, false) => Action::RemoveGuestFromProject,
            _ => return None,
        };
        Some(action)
    }

    /// Action guarding an invitation at this role level.
    pub const fn invite_action(self, op: InviteOp) -> Option<Action> {
        let action = match (self, op) {
            (Role::ProjectAdmin, InviteOp::Create) => Action::CreateAdminProjectInvite,
            (Role::ProjectAdmin, InviteOp::Edit) => Action::EditAdminProjectInvite,
            (Role::ProjectAdmin, InviteOp::Delete) => Action::DeleteAdminProjectInvite,
            (Role::ProjectManager, InviteOp::Create) => Action::CreateManagerProjectInvite,
            (Role::ProjectManager, InviteOp::Edit) => Action::EditManagerProjectInvite,
            (Role::ProjectManager, InviteOp::Delete) => Action::DeleteManagerProjectInvite,
            (Role::ProjectContributor, InviteOp::Create) => Action::CreateContributorProjectInvite,
            (Role::ProjectContributor, InviteOp::Edit) => Action::EditContributorProjectInvite,
            (Role::ProjectContributor, InviteOp::Delete) => Action::DeleteContributorProjectInvite,
            (Role::ProjectGuest, InviteOp::Create) => Action::CreateGuestProjectInvite,
            (Role::ProjectGuest, InviteOp::Edit) => Action::EditGuestProjectInvite,
            (Role::ProjectGuest, InviteOp::Delete) => Action::DeleteGuestProjectInvite,
            _ => return None,
        };
        Some(action)
    }
}
