//! Check command - compiles the site without writing anything

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use kiln_generator::Builder;

use super::load_config;
use crate::site_root;

/// Run the check command.
///
/// Loads the configuration, validates rules and layouts, and compiles every
/// item. Output conflicts and filter failures are reported as errors.
pub fn run(config_path: &Path) -> Result<()> {
    tracing::info!(?config_path, "Checking site");

    println!("Checking configuration...");
    let config = load_config(config_path)?;
    println!("  ✓ Configuration valid");

    println!("\nCompiling content...");
    let stats = Builder::new(config, site_root(config_path))
        .check()
        .wrap_err("Check failed")?;

    println!(
        "  ✓ {} compiled, {} copied, {} suppressed",
        stats.compiled, stats.passthrough, stats.suppressed
    );
    println!("\nNo problems found.");

    Ok(())
}
