//! Build command - compiles the site into the output directory

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use kiln_generator::Builder;

use super::load_config;
use crate::site_root;

/// Run the build command.
pub fn run(config_path: &Path, output: Option<&Path>, no_clean: bool) -> Result<()> {
    tracing::info!(?config_path, ?output, no_clean, "Starting build");

    let config = load_config(config_path)?;
    let mut builder = Builder::new(config, site_root(config_path));

    if let Some(output) = output {
        builder = builder.with_output_dir(output);
    }
    if no_clean {
        builder = builder.with_clean(false);
    }

    let stats = builder.build().wrap_err("Build failed")?;

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Compiled:    {}", stats.compiled);
    println!("  Copied:      {}", stats.passthrough);
    println!("  Suppressed:  {}", stats.suppressed);
    println!();
    println!("  Duration:    {}ms", stats.duration_ms);
    println!("  Output:      {}", builder.output_dir().display());
    println!();

    Ok(())
}
