use anyhow::{Context, Result};
use colored::*;

use crate::config::Config;
use crate::deploy;
use crate::hasher::ComponentHashes;
use crate::report::{write_report, TemplateData};
use crate::template::Template;

/// Run the update command - hash, fetch, render and write the README.
///
/// Steps run strictly in order and the first failure aborts the run. The
/// output file is not touched until the template has been parsed.
pub async fn run(config: &Config) -> Result<()> {
    tracing::info!("calculating component hashes");
    let hashes = ComponentHashes::compute(&config.paths)?;

    tracing::info!("getting latest deploy info");
    let deploy = deploy::fetch_latest(&config.gist)
        .await
        .context("Error getting deploy info")?;

    let data = TemplateData::new(hashes, deploy, &config.addresses);

    tracing::info!(template = %config.paths.template.display(), "reading template");
    let template = Template::parse_file(&config.paths.template).context("Error parsing template")?;

    tracing::info!(output = %config.paths.output.display(), "writing README");
    write_report(&template, &data, &config.paths.output)?;

    println!(
        "{} {} updated successfully",
        "✓".green(),
        config.paths.output.display()
    );

    Ok(())
}
