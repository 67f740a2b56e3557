//! Routes command - prints where each content item ends up

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use kiln_generator::{Builder, Disposition, RouteEntry, SuppressReason};

use super::load_config;
use crate::site_root;

/// Run the routes command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let routes = Builder::new(config, site_root(config_path))
        .routes()
        .wrap_err("Failed to plan routes")?;

    let width = routes
        .iter()
        .map(|entry| entry.identifier.len())
        .max()
        .unwrap_or(0);

    for entry in &routes {
        println!("{:<width$}  {}", entry.identifier, describe(entry));
    }

    Ok(())
}

fn describe(entry: &RouteEntry) -> String {
    match &entry.disposition {
        Disposition::Compiled(path) => path.clone(),
        Disposition::Passthrough(path) => format!("{path} (copy)"),
        Disposition::Suppressed(SuppressReason::Guard) => "(draft)".to_string(),
        Disposition::Suppressed(SuppressReason::OutputSkipped) => "(skipped)".to_string(),
    }
}
