use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Default location of the optional config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = ".mosaic-readme.toml";

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_DEPLOY_FILE: &str = "mosaic_tile_nft_deploy.json";

/// mosaic-readme configuration loaded from `.mosaic-readme.toml` and environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gist: GistConfig,
    pub paths: PathsConfig,
    pub addresses: AddressesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GistConfig {
    pub api_url: String,
    pub gist_id: String,
    /// Only ever taken from `GITHUB_TOKEN`
    #[serde(skip)]
    pub token: String,
    pub deploy_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub template: PathBuf,
    pub output: PathBuf,
    pub frontend: PathBuf,
    pub mosaic_tile: PathBuf,
}

/// Addresses listed in the balances table, keyed by role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressesConfig {
    pub deployer: String,
    pub minter: String,
    pub owner: String,
    pub user: String,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            gist_id: String::new(),
            token: String::new(),
            deploy_file: DEFAULT_DEPLOY_FILE.to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("README.template.md"),
            output: PathBuf::from("README.md"),
            frontend: PathBuf::from("frontend"),
            mosaic_tile: PathBuf::from("contracts/mosaic_tile_nft"),
        }
    }
}

impl AddressesConfig {
    /// Role/address pairs in a fixed order
    pub fn roles(&self) -> [(&'static str, &str); 4] {
        [
            ("deployer", self.deployer.as_str()),
            ("minter", self.minter.as_str()),
            ("owner", self.owner.as_str()),
            ("user", self.user.as_str()),
        ]
    }
}

impl Config {
    /// Load configuration from the given file and the process environment.
    /// Environment variables take precedence over config file values.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, |key| env::var(key).ok())
    }

    /// Same as [`Config::load`] with an explicit environment lookup
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env_overrides(lookup);

        Ok(config)
    }

    /// Apply environment variable overrides (env vars take precedence)
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Gist
        if let Some(val) = lookup("GITHUB_API_URL") {
            self.gist.api_url = val;
        }
        if let Some(val) = lookup("GIST_ID") {
            self.gist.gist_id = val;
        }
        if let Some(val) = lookup("GITHUB_TOKEN") {
            self.gist.token = val;
        }

        // Addresses
        if let Some(val) = lookup("DEPLOYER_ADDRESS") {
            self.addresses.deployer = val;
        }
        if let Some(val) = lookup("MINTER_ADDRESS") {
            self.addresses.minter = val;
        }
        if let Some(val) = lookup("OWNER_ADDRESS") {
            self.addresses.owner = val;
        }
        if let Some(val) = lookup("USER_ADDRESS") {
            self.addresses.user = val;
        }
    }

    /// Generate a config.toml content string
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_with(&dir.path().join("absent.toml"), |_| None).unwrap();

        assert_eq!(config.gist.api_url, DEFAULT_API_URL);
        assert_eq!(config.gist.deploy_file, DEFAULT_DEPLOY_FILE);
        assert_eq!(config.paths.template, PathBuf::from("README.template.md"));
        assert_eq!(config.paths.output, PathBuf::from("README.md"));
        assert_eq!(config.paths.frontend, PathBuf::from("frontend"));
        assert_eq!(config.paths.mosaic_tile, PathBuf::from("contracts/mosaic_tile_nft"));
        assert!(config.gist.gist_id.is_empty());
        assert!(config.addresses.deployer.is_empty());
    }

    #[test]
    fn test_env_populates_gist_and_addresses() {
        let dir = TempDir::new().unwrap();
        let lookup = lookup_from(&[
            ("GIST_ID", "abc123"),
            ("GITHUB_TOKEN", "secret"),
            ("DEPLOYER_ADDRESS", "stars1deployer"),
            ("USER_ADDRESS", "stars1user"),
        ]);
        let config = Config::load_with(&dir.path().join("absent.toml"), lookup).unwrap();

        assert_eq!(config.gist.gist_id, "abc123");
        assert_eq!(config.gist.token, "secret");
        assert_eq!(config.addresses.deployer, "stars1deployer");
        assert_eq!(config.addresses.user, "stars1user");
        assert_eq!(config.addresses.minter, "");
        assert_eq!(config.addresses.owner, "");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[paths]\noutput = \"docs/README.md\"\n\n[gist]\ngist_id = \"from-file\"\n",
        )
        .unwrap();

        let config = Config::load_with(&path, |_| None).unwrap();

        assert_eq!(config.paths.output, PathBuf::from("docs/README.md"));
        assert_eq!(config.paths.template, PathBuf::from("README.template.md"));
        assert_eq!(config.gist.gist_id, "from-file");
        assert_eq!(config.gist.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gist]\ngist_id = \"from-file\"\n").unwrap();

        let config = Config::load_with(&path, lookup_from(&[("GIST_ID", "from-env")])).unwrap();

        assert_eq!(config.gist.gist_id, "from-env");
    }

    #[test]
    fn test_token_is_never_read_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gist]\ntoken = \"leaked\"\n").unwrap();

        let config = Config::load_with(&path, |_| None).unwrap();

        assert!(config.gist.token.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[paths\noutput = ").unwrap();

        let err = Config::load_with(&path, |_| None).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_to_toml_string_omits_token() {
        let mut config = Config::default();
        config.gist.token = "secret".to_string();

        let content = config.to_toml_string().unwrap();

        assert!(content.contains("[gist]"));
        assert!(content.contains("[paths]"));
        assert!(content.contains("[addresses]"));
        assert!(!content.contains("secret"));
    }
}
