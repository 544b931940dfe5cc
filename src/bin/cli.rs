//! Rolegate CLI - Main entry point for CLI binary
//!
//! This binary provides the `rolegate` CLI tool for checking grants against a
//! policy catalog and inspecting the catalog itself.

use anyhow::Context;
use clap::Parser;
use rolegate_lib::engine::{
    cli::{
        formatter::{format_scope, format_target, CliFormatter},
        CatalogAction, Cli, Commands, OutputFormat,
    },
    config::EngineConfig,
    rbac::{drill_role_actions, drill_role_permissions, Action, Catalog, Enforcer, GrantSet, Role, TokenClaims},
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const EXIT_DENIED: i32 = 2;

fn main() {
    let cli = Cli::parse();

    match run_cli(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            CliFormatter::error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_cli(cli: Cli) -> anyhow::Result<i32> {
    let project_dir = cli.get_project_dir();
    let json_output = cli.format == OutputFormat::Json;

    let config = EngineConfig::load_or_default(&project_dir)
        .with_context(|| format!("loading config from {}", project_dir.display()))?;
    init_tracing(&config);

    let catalog = config
        .load_catalog(&project_dir)
        .context("building policy catalog")?;

    match cli.command {
        Commands::Check { grants, action, resource } => {
            return cmd_check(&catalog, &grants, action, resource.as_deref(), json_output);
        }
        Commands::Drill { role, actions } => {
            cmd_drill(&catalog, role, actions, json_output)?;
        }
        Commands::Resources { grants, action } => {
            cmd_resources(&catalog, &grants, action, json_output)?;
        }
        Commands::Claims { action, resource } => {
            cmd_claims(&catalog, action, &resource, json_output)?;
        }
        Commands::Catalog { action } => {
            cmd_catalog(&catalog, action, json_output)?;
        }
    }

    Ok(0)
}

fn load_grants(path: &Path) -> anyhow::Result<GrantSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading claims from {}", path.display()))?;
    let claims: TokenClaims = serde_json::from_str(&content)
        .with_context(|| format!("parsing claims in {}", path.display()))?;
    Ok(GrantSet::from_claims(&claims)?)
}

fn cmd_check(
    catalog: &Catalog,
    grants_path: &Path,
    action: Action,
    resource: Option<&str>,
    json: bool,
) -> anyhow::Result<i32> {
    let grants = load_grants(grants_path)?;
    let allowed = Enforcer::new(catalog).is_authorized(&grants, action, resource);

    if json {
        println!("{}", serde_json::json!({
            "action": action,
            "resource": resource,
            "allowed": allowed,
        }));
    } else {
        CliFormatter::decision(allowed, &format_target(action.as_str(), resource));
    }

    Ok(if allowed { 0 } else { EXIT_DENIED })
}

fn cmd_drill(catalog: &Catalog, role: Role, actions: bool, json: bool) -> anyhow::Result<()> {
    let tags: Vec<&'static str> = if actions {
        drill_role_actions(catalog, role).into_iter().map(Action::as_str).collect()
    } else {
        drill_role_permissions(catalog, role).into_iter().map(|p| p.as_str()).collect()
    };

    let listing = if actions { "actions" } else { "permissions" };

    if json {
        let mut out = serde_json::json!({
            "role": role,
            "scope": role.scope(),
        });
        out[listing] = serde_json::json!(tags);
        println!("{}", out);
        return Ok(());
    }

    CliFormatter::header(&format!("{} ({})", role.name(), role));
    CliFormatter::kv("Scope", &format_scope(role));
    CliFormatter::kv("Description", role.description());
    CliFormatter::kv(if actions { "Actions" } else { "Permissions" }, &tags.len().to_string());
    if tags.is_empty() {
        CliFormatter::info("Role grants nothing in this catalog");
    }
    for tag in tags {
        CliFormatter::item(tag);
    }
    Ok(())
}

fn cmd_resources(catalog: &Catalog, grants_path: &Path, action: Action, json: bool) -> anyhow::Result<()> {
    let grants = load_grants(grants_path)?;
    let resources = Enforcer::new(catalog).resources_for_action(&grants, action);

    if json {
        println!("{}", serde_json::json!({
            "action": action,
            "resources": resources,
        }));
    } else if resources.is_empty() {
        CliFormatter::info(&format!("No scoped grants allow {}", action));
    } else {
        CliFormatter::header(&format!("Resources allowing {}", action));
        for id in &resources {
            CliFormatter::item(id);
        }
    }
    Ok(())
}

fn cmd_claims(catalog: &Catalog, action: Action, resource: &str, json: bool) -> anyhow::Result<()> {
    let claims = Enforcer::new(catalog).satisfying_claims(action, resource);

    if json {
        println!("{}", serde_json::json!({
            "action": action,
            "resource": resource,
            "claims": claims,
        }));
    } else {
        CliFormatter::header(&format!("Claims authorizing {}", format_target(action.as_str(), Some(resource))));
        for claim in &claims {
            CliFormatter::item(claim);
        }
    }
    Ok(())
}

fn cmd_catalog(catalog: &Catalog, action: CatalogAction, json: bool) -> anyhow::Result<()> {
    match action {
        CatalogAction::Validate => {
            let def = catalog.definition();
            if json {
                println!("{}", serde_json::json!({
                    "valid": true,
                    "actions": def.actions.len(),
                    "permissions": def.permissions.len(),
                    "roles": def.roles.len(),
                    "fingerprint": catalog.fingerprint(),
                }));
            } else {
                CliFormatter::success("Catalog is valid");
                CliFormatter::table_header(&["Actions", "Permissions", "Roles"]);
                let counts = [def.actions.len(), def.permissions.len(), def.roles.len()].map(|n| n.to_string());
                CliFormatter::table_row(&[counts[0].as_str(), counts[1].as_str(), counts[2].as_str()]);
                CliFormatter::kv("Fingerprint", catalog.fingerprint());
            }
        }
        CatalogAction::Export => {
            println!("{}", serde_json::to_string_pretty(catalog.definition())?);
        }
        CatalogAction::Fingerprint => {
            if json {
                println!("{}", serde_json::json!({ "fingerprint": catalog.fingerprint() }));
            } else {
                println!("{}", catalog.fingerprint());
            }
        }
    }
    Ok(())
}
