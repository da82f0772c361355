//! mosaic-readme library - regenerates the project README from a template
//!
//! This library provides the core functionality for the `mosaic-readme` CLI tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod hasher;
pub mod logging;
pub mod report;
pub mod template;
pub mod templates;
