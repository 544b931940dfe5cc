//! Rolegate CLI Module
//! Command-line interface for inspecting policies and checking grants

pub mod formatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::rbac::{Action, Role};

#[derive(Parser, Debug)]
#[command(name = "rolegate")]
#[command(author = "Rolegate Team")]
#[command(version)]
#[command(about = "Role and permission authorization engine", long_about = None)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Output format (json for scripting)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decide whether a set of claims authorizes an action
    Check {
        /// JSON file holding token claims
        #[arg(short, long)]
        grants: PathBuf,

        /// Action tag, e.g. DELETE_PROJECT
        #[arg(short, long)]
        action: Action,

        /// Resource instance id
        #[arg(short, long)]
        resource: Option<String>,
    },

    /// Show everything a role grants
    Drill {
        /// Role tag, e.g. PROJECT_MANAGER
        role: Role,

        /// List actions instead of permissions
        #[arg(long)]
        actions: bool,
    },

    /// List resource ids on which the claims grant an action
    Resources {
        /// JSON file holding token claims
        #[arg(short, long)]
        grants: PathBuf,

        /// Action tag
        #[arg(short, long)]
        action: Action,
    },

    /// List claims that would authorize an action on a resource
    Claims {
        /// Action tag
        #[arg(short, long)]
        action: Action,

        /// Resource instance id
        #[arg(short, long)]
        resource: String,
    },

    /// Catalog management
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// Build the configured catalog and report problems
    Validate,

    /// Print the catalog definition as JSON
    Export,

    /// Print the catalog fingerprint
    Fingerprint,
}

impl Cli {
    pub fn get_project_dir(&self) -> PathBuf {
        self.project
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
