use rolegate_lib::engine::config::{CatalogSource, ConfigError, EngineConfig, CONFIG_FILE};
use rolegate_lib::engine::rbac::{
    Action, Catalog, CatalogDefinition, CatalogError, Permission, Resource, Role, CATALOG_VERSION,
};
use std::fs;

fn rejected(def: CatalogDefinition) -> CatalogError {
    match Catalog::build(def) {
        Ok(_) => panic!("malformed catalog was accepted"),
        Err(e) => e,
    }
}

#[test]
fn test_definition_file_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("catalog.json");

    let def = CatalogDefinition::builtin();
    def.save(&path)?;

    let raw = fs::read_to_string(&path)?;
    assert!(raw.contains("\"DELETE_PROJECT\""));
    assert!(raw.contains("\"resourceSpecific\""));

    let loaded = CatalogDefinition::load(&path)?;
    assert_eq!(loaded, def);

    let from_file = Catalog::build(loaded)?;
    let builtin = Catalog::build(def)?;
    assert_eq!(from_file.fingerprint(), builtin.fingerprint());
    Ok(())
}

#[test]
fn test_fingerprint_tracks_definition_changes() -> Result<(), Box<dyn std::error::Error>> {
    let base = Catalog::build(CatalogDefinition::builtin())?;

    let mut def = CatalogDefinition::builtin();
    def.assign(
        Role::GeneralUser,
        &[Permission::ProjectList, Permission::TemplateView, Permission::ProjectCreate],
        &[],
    );
    let changed = Catalog::build(def)?;

    assert_ne!(base.fingerprint(), changed.fingerprint());
    Ok(())
}

#[test]
fn test_load_rejects_newer_version() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("catalog.json");

    let mut def = CatalogDefinition::builtin();
    def.version = CATALOG_VERSION + 1;
    def.save(&path)?;

    match CatalogDefinition::load(&path) {
        Err(CatalogError::UnsupportedVersion { found, supported }) => {
            assert_eq!(found, CATALOG_VERSION + 1);
            assert_eq!(supported, CATALOG_VERSION);
        }
        other => panic!("expected version error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_load_rejects_unknown_tags() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("catalog.json");
    fs::write(
        &path,
        r#"{"version":1,"actions":{"LAUNCH_ROCKETS":{"resource":"SYSTEM","resourceSpecific":false}},"permissions":{},"roles":{}}"#,
    )?;

    assert!(matches!(CatalogDefinition::load(&path), Err(CatalogError::Json(_))));
    assert!(matches!(
        CatalogDefinition::load(&dir.path().join("missing.json")),
        Err(CatalogError::Io(_))
    ));
    Ok(())
}

#[test]
fn test_cross_resource_grant_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.grant(
        Permission::TemplateView,
        Resource::Template,
        &[Action::ViewTemplates, Action::ReadProjectMetadata],
        &[],
    );

    assert!(matches!(
        rejected(def),
        CatalogError::CrossResourceGrant {
            permission: Permission::TemplateView,
            action: Action::ReadProjectMetadata,
            ..
        }
    ));
}

#[test]
fn test_inherited_cross_resource_grant_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.grant(
        Permission::TemplateView,
        Resource::Template,
        &[Action::ViewTemplates],
        &[Permission::ProjectView],
    );

    assert!(matches!(
        rejected(def),
        CatalogError::CrossResourceGrant {
            permission: Permission::TemplateView,
            action_resource: Resource::Project,
            ..
        }
    ));
}

#[test]
fn test_resource_role_outside_its_resource_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.assign(
        Role::ProjectGuest,
        &[Permission::ProjectView, Permission::ProjectDataAdd, Permission::TemplateView],
        &[],
    );

    assert!(matches!(
        rejected(def),
        CatalogError::ResourceSpecificRoleMismatch {
            role: Role::ProjectGuest,
            action: Action::ViewTemplates,
            ..
        }
    ));
}

#[test]
fn test_duplicate_action_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.grant(
        Permission::ProjectView,
        Resource::Project,
        &[Action::ReadProjectMetadata, Action::ReadProjectMetadata],
        &[],
    );

    assert!(matches!(
        rejected(def),
        CatalogError::DuplicateAction {
            permission: Permission::ProjectView,
            action: Action::ReadProjectMetadata,
        }
    ));
}

#[test]
fn test_role_cycle_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.assign(
        Role::GeneralUser,
        &[Permission::ProjectList, Permission::TemplateView],
        &[Role::GeneralAdmin],
    );

    match rejected(def) {
        CatalogError::RoleCycle(path) => {
            assert_eq!(path.first(), path.last());
            assert!(path.contains(&Role::GeneralAdmin));
            assert!(path.contains(&Role::GeneralUser));
        }
        other => panic!("expected role cycle, got {other:?}"),
    }
}

#[test]
fn test_permission_cycle_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.grant(
        Permission::ProjectDataReadMine,
        Resource::Project,
        &[Action::ReadMyProjectRecords],
        &[Permission::ProjectDataAdd],
    );

    assert!(matches!(rejected(def), CatalogError::PermissionCycle(_)));
}

#[test]
fn test_resource_without_actions_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.actions.retain(|_, entry| entry.resource != Resource::System);
    def.grant(Permission::SystemManage, Resource::System, &[], &[]);

    assert!(matches!(
        rejected(def),
        CatalogError::ResourceWithoutActions(Resource::System)
    ));
}

#[test]
fn test_ungranted_action_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.grant(
        Permission::SystemManage,
        Resource::System,
        &[Action::InitialiseSystemApi, Action::RestoreFromBackup],
        &[],
    );

    assert!(matches!(
        rejected(def),
        CatalogError::UngrantedAction(Action::ValidateDbs)
    ));
}

#[test]
fn test_unreachable_permission_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.assign(
        Role::GeneralAdmin,
        &[Permission::UserManage],
        &[Role::GeneralUser, Role::GeneralCreator, Role::ProjectAdmin],
    );

    assert!(matches!(
        rejected(def),
        CatalogError::UnreachablePermission(Permission::SystemManage)
    ));
}

#[test]
fn test_undeclared_references_rejected() {
    let mut def = CatalogDefinition::builtin();
    def.actions.remove(&Action::ValidateDbs);
    assert!(matches!(
        rejected(def),
        CatalogError::UndeclaredAction {
            permission: Permission::SystemManage,
            action: Action::ValidateDbs,
        }
    ));

    let mut def = CatalogDefinition::builtin();
    def.permissions.remove(&Permission::UserManage);
    assert!(matches!(rejected(def), CatalogError::UndeclaredPermission { .. }));

    let mut def = CatalogDefinition::builtin();
    def.roles.remove(&Role::GeneralCreator);
    assert!(matches!(
        rejected(def),
        CatalogError::UndeclaredRole {
            referrer: Role::GeneralAdmin,
            role: Role::GeneralCreator,
        }
    ));
}

#[test]
fn test_config_loads_catalog_relative_to_project() -> Result<(), Box<dyn std::error::Error>> {
    let project = tempfile::tempdir()?;
    fs::create_dir(project.path().join("policy"))?;
    CatalogDefinition::builtin().save(&project.path().join("policy").join("catalog.json"))?;

    let config = EngineConfig::with_catalog_file("policy/catalog.json");
    config.save(project.path())?;

    let raw = fs::read_to_string(project.path().join(CONFIG_FILE))?;
    assert!(raw.contains("\"source\": \"file\""));

    let loaded = EngineConfig::load(project.path())?;
    assert_eq!(loaded, config);

    let catalog = loaded.load_catalog(project.path())?;
    let builtin = Catalog::build(CatalogDefinition::builtin())?;
    assert_eq!(catalog.fingerprint(), builtin.fingerprint());
    Ok(())
}

#[test]
fn test_missing_config_falls_back_to_builtin() -> Result<(), Box<dyn std::error::Error>> {
    let project = tempfile::tempdir()?;

    assert!(matches!(
        EngineConfig::load(project.path()),
        Err(ConfigError::NotFound(_))
    ));

    let config = EngineConfig::load_or_default(project.path())?;
    assert_eq!(config.catalog, CatalogSource::Builtin);
    assert_eq!(config.logging.filter, "warn");
    Ok(())
}

#[test]
fn test_config_surfaces_catalog_faults() -> Result<(), Box<dyn std::error::Error>> {
    let project = tempfile::tempdir()?;
    let mut def = CatalogDefinition::builtin();
    def.grant(
        Permission::ProjectView,
        Resource::Project,
        &[Action::ReadProjectMetadata],
        &[Permission::ProjectView],
    );
    def.save(&project.path().join("catalog.json"))?;

    let config = EngineConfig::with_catalog_file("catalog.json");
    assert!(matches!(
        config.load_catalog(project.path()),
        Err(ConfigError::Catalog(CatalogError::PermissionCycle(_)))
    ));

    fs::write(project.path().join(CONFIG_FILE), "{ not json")?;
    assert!(matches!(
        EngineConfig::load_or_default(project.path()),
        Err(ConfigError::ParseError(_))
    ));
    Ok(())
}
