use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::Path;

use mosaic_readme::cli::{Cli, Commands};
use mosaic_readme::commands;
use mosaic_readme::config::Config;
use mosaic_readme::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        println!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Commands::Update {
        template: None,
        output: None,
    }) {
        Commands::Update { template, output } => {
            let mut config = Config::load(&cli.config)?;
            if let Some(template) = template {
                config.paths.template = template;
            }
            if let Some(output) = output {
                config.paths.output = output;
            }
            commands::update::run(&config).await
        }
        Commands::Hash { dirs } => commands::hash::run(&dirs),
        Commands::Init { force } => commands::init::run(Path::new("."), force),
        Commands::Version => commands::version::run(),
    }
}
