//! CLI Output Formatting Module
//! Provides consistent, colorized output for terminal UX

use colored::Colorize;

use crate::engine::rbac::{Role, RoleScope};

pub struct CliFormatter;

impl CliFormatter {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue().bold(), message);
    }

    /// Print a section header
    pub fn header(title: &str) {
        println!("\n{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(title.len()).bright_black());
    }

    /// Print a key-value pair
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.bright_white().bold(), value);
    }

    /// Print a list item
    pub fn item(text: &str) {
        println!("  {} {}", "•".bright_black(), text);
    }

    /// Print a table header
    pub fn table_header(columns: &[&str]) {
        let header = columns
            .iter()
            .map(|c| c.bright_white().bold().to_string())
            .collect::<Vec<_>>()
            .join(" │ ");
        println!("  {}", header);
        println!("  {}", "─".repeat(header.len()).bright_black());
    }

    /// Print a table row
    pub fn table_row(values: &[&str]) {
        println!("  {}", values.join(" │ "));
    }

    pub fn decision(allowed: bool, subject: &str) {
        if allowed {
            println!("{} {} {}", "✓".green().bold(), "ALLOW".green().bold(), subject);
        } else {
            println!("{} {} {}", "✗".red().bold(), "DENY".red().bold(), subject);
        }
    }
}

/// Describe an action target, e.g. `DELETE_PROJECT on p1`
pub fn format_target(action: &str, resource_id: Option<&str>) -> String {
    match resource_id {
        Some(id) => format!("{} on {}", action, id),
        None => action.to_string(),
    }
}

/// Short label for a role's scope
pub fn format_scope(role: Role) -> String {
    match (role.scope(), role.resource()) {
        (RoleScope::Global, _) => "global".to_string(),
        (RoleScope::ResourceSpecific, Some(resource)) => format!("per {}", resource.as_str().to_lowercase()),
        (RoleScope::ResourceSpecific, None) => "per resource".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_target() {
        assert_eq!(format_target("DELETE_PROJECT", Some("p1")), "DELETE_PROJECT on p1");
        assert_eq!(format_target("LIST_PROJECTS", None), "LIST_PROJECTS");
    }

    #[test]
    fn test_format_scope() {
        assert_eq!(format_scope(Role::GeneralAdmin), "global");
        assert_eq!(format_scope(Role::ProjectGuest), "per project");
    }
}
