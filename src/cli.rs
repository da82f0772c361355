use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "mosaic-readme")]
#[command(version)]
#[command(about = "Regenerate README.md from README.template.md")]
#[command(long_about = "Regenerates the project README from a template, filling in content \
fingerprints of the frontend and mosaic tile contract directories, the latest deployment \
recorded in the deploy gist, and the role addresses taken from the environment.")]
pub struct Cli {
    /// Path to the optional config file
    #[arg(short, long, global = true, env = "MOSAIC_README_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Regenerate the README (default)
    Update {
        /// Template to render (overrides config)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// File to write (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the content fingerprint of one or more directories
    Hash {
        /// Directories to fingerprint
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },

    /// Write a starter README.template.md and config file
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show version information
    Version,
}
