use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Contract '{0}' is not listed in the manifest")]
    MissingContract(String),

    #[error("Contract '{0}' has no deployment aliases")]
    NoAliases(String),

    #[error("Contract '{contract}' is only declared by its source path {path}")]
    SourceOnly { contract: String, path: String },

    #[error("Contract '{contract}' has no alias for network '{network}'")]
    MissingAlias { contract: String, network: String },
}

/// The subset of flow.json needed to locate deployed contracts.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub contracts: HashMap<String, ContractEntry>,
}

/// A contract is either a bare source path or a detailed entry with aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContractEntry {
    Source(String),
    Detailed {
        #[serde(default)]
        aliases: HashMap<String, String>,
    },
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let data = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Address the contract is deployed at on `network`, exactly as written in the manifest.
    pub fn contract_address(&self, contract: &str, network: &str) -> Result<&str, ManifestError> {
        let entry = self
            .contracts
            .get(contract)
            .ok_or_else(|| ManifestError::MissingContract(contract.to_string()))?;

        let aliases = match entry {
            ContractEntry::Source(path) => {
                return Err(ManifestError::SourceOnly {
                    contract: contract.to_string(),
                    path: path.clone(),
                });
            }
            ContractEntry::Detailed { aliases } if aliases.is_empty() => {
                return Err(ManifestError::NoAliases(contract.to_string()));
            }
            ContractEntry::Detailed { aliases } => aliases,
        };

        aliases
            .get(network)
            .map(String::as_str)
            .ok_or_else(|| ManifestError::MissingAlias {
                contract: contract.to_string(),
                network: network.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOW_JSON: &str = r#"{
        "contracts": {
            "AutoGame": {
                "source": "./cadence/contracts/AutoGame.cdc",
                "aliases": {
                    "emulator": "f8d6e0586b0a20c7",
                    "testnet": "0x8a4dce54554b225d"
                }
            },
            "Helper": "./cadence/contracts/Helper.cdc"
        },
        "networks": { "emulator": "127.0.0.1:3569" }
    }"#;

    #[test]
    fn test_emulator_alias() {
        let manifest = Manifest::from_json(FLOW_JSON).unwrap();
        assert_eq!(
            manifest.contract_address("AutoGame", "emulator").unwrap(),
            "f8d6e0586b0a20c7"
        );
    }

    #[test]
    fn test_alias_kept_verbatim() {
        let manifest = Manifest::from_json(FLOW_JSON).unwrap();
        assert_eq!(
            manifest.contract_address("AutoGame", "testnet").unwrap(),
            "0x8a4dce54554b225d"
        );
    }

    #[test]
    fn test_missing_contract() {
        let manifest = Manifest::from_json(FLOW_JSON).unwrap();
        let err = manifest.contract_address("Nope", "emulator").unwrap_err();
        assert!(matches!(err, ManifestError::MissingContract(ref c) if c == "Nope"));
    }

    #[test]
    fn test_missing_network() {
        let manifest = Manifest::from_json(FLOW_JSON).unwrap();
        let err = manifest.contract_address("AutoGame", "mainnet").unwrap_err();
        assert!(matches!(err, ManifestError::MissingAlias { .. }));
        assert!(err.to_string().contains("mainnet"));
    }

    #[test]
    fn test_source_only_contract() {
        let manifest = Manifest::from_json(FLOW_JSON).unwrap();
        let err = manifest.contract_address("Helper", "emulator").unwrap_err();
        assert!(matches!(err, ManifestError::SourceOnly { .. }));
    }

    #[test]
    fn test_malformed_manifest() {
        assert!(matches!(
            Manifest::from_json("{\"contracts\": 5}"),
            Err(ManifestError::Parse(_))
        ));
        assert!(Manifest::from_json("not json").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Manifest::load(Path::new("/nonexistent/flow.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");
        fs::write(&path, FLOW_JSON).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert!(manifest.contracts.contains_key("AutoGame"));
    }
}
