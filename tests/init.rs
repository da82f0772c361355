//! Integration tests for the `mosaic-readme init` command

use std::fs;
use tempfile::TempDir;

use mosaic_readme::commands::init;
use mosaic_readme::config::{Config, DEFAULT_API_URL, DEFAULT_CONFIG_PATH};
use mosaic_readme::deploy::DeployInfo;
use mosaic_readme::hasher::ComponentHashes;
use mosaic_readme::report::TemplateData;
use mosaic_readme::template::Template;

#[test]
fn test_init_creates_template_and_config() {
    let dir = TempDir::new().unwrap();

    init::run(dir.path(), false).unwrap();

    assert!(dir.path().join("README.template.md").exists());
    assert!(dir.path().join(DEFAULT_CONFIG_PATH).exists());
}

#[test]
fn test_init_config_loads_back() {
    let dir = TempDir::new().unwrap();
    init::run(dir.path(), false).unwrap();

    let path = dir.path().join(DEFAULT_CONFIG_PATH);
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# mosaic-readme configuration"));
    assert!(content.contains("[gist]"));
    assert!(content.contains("[paths]"));

    let config = Config::load_with(&path, |_| None).unwrap();
    assert_eq!(config.gist.api_url, DEFAULT_API_URL);
    assert!(config.gist.token.is_empty());
}

#[test]
fn test_init_template_renders() {
    let dir = TempDir::new().unwrap();
    init::run(dir.path(), false).unwrap();

    let template = Template::parse_file(&dir.path().join("README.template.md")).unwrap();
    let mut config = Config::default();
    config.addresses.owner = "stars1owner".to_string();

    let data = TemplateData::new(
        ComponentHashes {
            frontend: "1234abcd".to_string(),
            mosaic_tile: "dcba4321".to_string(),
        },
        DeployInfo {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            mosaic_tile_address: "stars1tile".to_string(),
        },
        &config.addresses,
    );
    let readme = template.render(&data).unwrap();

    assert!(readme.contains("| Frontend | `1234abcd` |"));
    assert!(readme.contains("| Mosaic Tile NFT | `dcba4321` |"));
    assert!(readme.contains("- Mosaic Tile NFT: `stars1tile`"));
    assert!(readme.contains("| owner | `stars1owner` |  |"));
    assert!(readme.contains("| user | `` |  |"));
}

#[test]
fn test_init_template_without_deploy() {
    let dir = TempDir::new().unwrap();
    init::run(dir.path(), false).unwrap();

    let template = Template::parse_file(&dir.path().join("README.template.md")).unwrap();
    let data = TemplateData::new(
        ComponentHashes::default(),
        DeployInfo::default(),
        &Config::default().addresses,
    );
    let readme = template.render(&data).unwrap();

    assert!(readme.contains("## Latest Deployment\n\nNo deployment recorded yet.\n\n## Accounts"));
}

#[test]
fn test_init_fails_without_force() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("README.template.md"), "mine").unwrap();

    let err = init::run(dir.path(), false).unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert_eq!(
        fs::read_to_string(dir.path().join("README.template.md")).unwrap(),
        "mine"
    );
    assert!(!dir.path().join(DEFAULT_CONFIG_PATH).exists());
}

#[test]
fn test_init_with_force_overwrites() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("README.template.md"), "mine").unwrap();
    fs::write(dir.path().join(DEFAULT_CONFIG_PATH), "old = true").unwrap();

    init::run(dir.path(), true).unwrap();

    let template = fs::read_to_string(dir.path().join("README.template.md")).unwrap();
    assert!(template.contains("{{ .Hashes.Frontend }}"));
    let config = fs::read_to_string(dir.path().join(DEFAULT_CONFIG_PATH)).unwrap();
    assert!(config.contains("[gist]"));
}
