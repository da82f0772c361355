use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::fs;
use std::path::Path;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::templates;

const TEMPLATE_FILE: &str = "README.template.md";

/// Run the init command - write a starter template and config into `root`
pub fn run(root: &Path, force: bool) -> Result<()> {
    let template_path = root.join(TEMPLATE_FILE);
    let config_path = root.join(DEFAULT_CONFIG_PATH);

    if !force {
        for path in [&template_path, &config_path] {
            if path.exists() {
                bail!(
                    "{} already exists. Use --force to overwrite, or remove it first.",
                    path.display()
                );
            }
        }
    }

    fs::write(&template_path, templates::README_TEMPLATE)
        .with_context(|| format!("Failed to write {}", template_path.display()))?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let config_content = format!(
        "{}{}",
        templates::CONFIG_HEADER.replace("{timestamp}", &timestamp),
        Config::default().to_toml_string()?
    );
    fs::write(&config_path, config_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Wrote {} and {}", TEMPLATE_FILE, DEFAULT_CONFIG_PATH);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to taste", TEMPLATE_FILE);
    println!("  2. Export GIST_ID and GITHUB_TOKEN");
    println!("  3. Run 'mosaic-readme update'");

    Ok(())
}
