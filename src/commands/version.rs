use anyhow::Result;

/// Run the version command - display version information
pub fn run() -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");

    println!("{} v{}", name, version);

    if let Some(hash) = option_env!("MOSAIC_README_BUILD_HASH") {
        println!("Build: {}", hash);
    }

    Ok(())
}
