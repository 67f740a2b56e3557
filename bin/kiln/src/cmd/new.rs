//! New command - creates a draft article

use std::{fs, path::Path};

use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr, bail};

use super::load_config;
use crate::site_root;

/// Run the new command.
///
/// Creates `<content_dir>/articles/<slug>.md` as a draft.
pub fn run(config_path: &Path, slug: &str, title: Option<&str>) -> Result<()> {
    tracing::info!(slug, ?title, "Creating new article");

    if !is_valid_slug(slug) {
        bail!("Invalid slug `{slug}`: use lowercase letters, digits and dashes");
    }

    let config = load_config(config_path)?;
    let file_path = site_root(config_path)
        .join(&config.build.content_dir)
        .join("articles")
        .join(format!("{slug}.md"));

    if file_path.exists() {
        bail!("{} already exists", file_path.display());
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).wrap_err("Failed to create directories")?;
    }

    let title = title.map_or_else(|| title_from_slug(slug), str::to_string);
    fs::write(&file_path, article_template(&title)).wrap_err("Failed to write file")?;

    tracing::info!(?file_path, "Created new article");
    println!("Created: {}", file_path.display());

    Ok(())
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn article_template(title: &str) -> String {
    let title = title.replace('\\', "\\\\").replace('"', "\\\"");
    let date = Utc::now().format("%Y-%m-%d");

    format!(
        r#"---
title: "{title}"
kind: article
status: draft
created_at: {date}
---

Write your article here.
"#
    )
}
