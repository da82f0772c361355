//! Embedded starter files for `mosaic-readme init`

/// Starter README template, in the syntax `update` renders
pub const README_TEMPLATE: &str = r#"# Mosaic

_Last updated: {{ .LastUpdated }}_

## Components

| Component | Fingerprint |
|-----------|-------------|
| Frontend | `{{ .Hashes.Frontend }}` |
| Mosaic Tile NFT | `{{ .Hashes.MosaicTile }}` |

## Latest Deployment

{{ if .Deploy.MosaicTileAddress -}}
- Deployed: {{ .Deploy.Timestamp }}
- Mosaic Tile NFT: `{{ .Deploy.MosaicTileAddress }}`
{{- else -}}
No deployment recorded yet.
{{- end }}

## Accounts

| Role | Address | Balance |
|------|---------|---------|
{{- range $role, $data := .Balances }}
| {{ $role }} | `{{ $data.Address }}` | {{ $data.Balance }} |
{{- end }}
"#;

/// Header written above the serialized default config
pub const CONFIG_HEADER: &str = r#"# mosaic-readme configuration
# Generated: {timestamp}
#
# Environment variables take precedence over values in this file:
#   GITHUB_API_URL, GIST_ID, GITHUB_TOKEN (never stored here),
#   DEPLOYER_ADDRESS, MINTER_ADDRESS, OWNER_ADDRESS, USER_ADDRESS

"#;
