//! README data record and rendering

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::AddressesConfig;
use crate::deploy::DeployInfo;
use crate::hasher::ComponentHashes;
use crate::template::Template;

/// Address shown in the balances table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BalanceInfo {
    pub address: String,
    /// Never populated; kept so templates can reference the column
    pub balance: String,
}

/// Everything the README template can reference
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateData {
    pub last_updated: String,
    pub hashes: ComponentHashes,
    pub deploy: DeployInfo,
    pub balances: BTreeMap<String, BalanceInfo>,
}

impl TemplateData {
    /// Build the record, stamping it with the current time
    pub fn new(hashes: ComponentHashes, deploy: DeployInfo, addresses: &AddressesConfig) -> Self {
        Self::at(Utc::now(), hashes, deploy, addresses)
    }

    /// Build the record for a fixed generation time
    pub fn at(
        now: DateTime<Utc>,
        hashes: ComponentHashes,
        deploy: DeployInfo,
        addresses: &AddressesConfig,
    ) -> Self {
        let balances = addresses
            .roles()
            .into_iter()
            .map(|(role, address)| {
                (
                    role.to_string(),
                    BalanceInfo {
                        address: address.to_string(),
                        balance: String::new(),
                    },
                )
            })
            .collect();

        Self {
            last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            hashes,
            deploy,
            balances,
        }
    }
}

/// Create (or truncate) `output` and stream the rendered template into it.
///
/// The file is only touched once the template has parsed; an execution
/// error leaves whatever was written so far.
pub fn write_report(template: &Template, data: &TemplateData, output: &Path) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Error creating output file {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    template
        .execute(&mut writer, data)
        .context("Error executing template")?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::debug!(template = template.name(), output = %output.display(), "rendered report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_data(addresses: &AddressesConfig) -> TemplateData {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        TemplateData::at(
            now,
            ComponentHashes {
                frontend: "aaaa1111".to_string(),
                mosaic_tile: "bbbb2222".to_string(),
            },
            DeployInfo {
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                mosaic_tile_address: "0xabc".to_string(),
            },
            addresses,
        )
    }

    #[test]
    fn test_last_updated_is_rfc3339_utc() {
        let data = sample_data(&AddressesConfig::default());
        assert_eq!(data.last_updated, "2024-01-02T03:04:05Z");
    }

    #[test]
    fn test_new_stamps_current_time() {
        let data = TemplateData::new(
            ComponentHashes::default(),
            DeployInfo::default(),
            &AddressesConfig::default(),
        );
        let parsed = DateTime::parse_from_rfc3339(&data.last_updated).unwrap();
        assert!((Utc::now() - parsed.with_timezone(&Utc)).num_seconds().abs() < 60);
        assert!(data.last_updated.ends_with('Z'));
    }

    #[test]
    fn test_balances_cover_all_roles_with_empty_balance() {
        let addresses = AddressesConfig {
            deployer: "stars1d".to_string(),
            minter: "stars1m".to_string(),
            ..AddressesConfig::default()
        };
        let data = sample_data(&addresses);

        let roles: Vec<&str> = data.balances.keys().map(String::as_str).collect();
        assert_eq!(roles, vec!["deployer", "minter", "owner", "user"]);
        assert_eq!(data.balances["deployer"].address, "stars1d");
        assert_eq!(data.balances["minter"].address, "stars1m");
        assert_eq!(data.balances["owner"].address, "");
        assert!(data.balances.values().all(|b| b.balance.is_empty()));
    }

    #[test]
    fn test_serialized_field_names() {
        let data = sample_data(&AddressesConfig::default());
        let value = serde_json::to_value(&data).unwrap();

        assert_eq!(value["LastUpdated"], "2024-01-02T03:04:05Z");
        assert_eq!(value["Hashes"]["Frontend"], "aaaa1111");
        assert_eq!(value["Hashes"]["MosaicTile"], "bbbb2222");
        assert_eq!(value["Deploy"]["Timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(value["Deploy"]["MosaicTileAddress"], "0xabc");
        assert_eq!(value["Balances"]["user"]["Address"], "");
        assert_eq!(value["Balances"]["user"]["Balance"], "");
    }

    #[test]
    fn test_write_report_renders_into_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("README.md");
        std::fs::write(&output, "stale content that is much longer than the new one").unwrap();

        let template = Template::parse(
            "README.template.md",
            "tile {{ .Hashes.MosaicTile }} at {{ .Deploy.MosaicTileAddress }}",
        )
        .unwrap();
        write_report(&template, &sample_data(&AddressesConfig::default()), &output).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "tile bbbb2222 at 0xabc"
        );
    }

    #[test]
    fn test_write_report_missing_parent_fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("missing/README.md");
        let template = Template::parse("t", "x").unwrap();

        let err = write_report(&template, &sample_data(&AddressesConfig::default()), &output)
            .unwrap_err();
        assert!(err.to_string().contains("Error creating output file"));
    }

    #[test]
    fn test_write_report_execution_error() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("README.md");
        let template = Template::parse("t", "before {{ .Nope }}").unwrap();

        let err = write_report(&template, &sample_data(&AddressesConfig::default()), &output)
            .unwrap_err();
        assert!(err.to_string().contains("Error executing template"));
        assert!(output.exists());
    }
}
