//! Per-network configuration.
//!
//! The pipeline never computes any of this; it is supplied at startup and read-only afterwards.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_CONFIRMATION_TIMEOUT, MIN_CONFIRMATIONS},
    ConfirmationPolicy,
};

/// Errors raised while resolving a network.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    /// The network is neither built in nor in the config file
    #[error("unknown network '{0}'")]
    UnknownNetwork(String),
}

/// Block explorer endpoints of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerConfig {
    /// Etherscan-compatible API endpoint.
    pub api_url: String,
    /// Human-facing explorer root.
    pub browser_url: String,
    /// API key, if the explorer requires one.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Everything needed to deploy to one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Network name, also passed to the verifier.
    pub name: String,
    /// Expected chain id; the RPC endpoint must report the same.
    pub chain_id: u64,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Block explorer, if any.
    #[serde(default)]
    pub explorer: Option<ExplorerConfig>,
    /// Confirmation depth awaited for every deployment.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Confirmation wait timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

const fn default_confirmations() -> u64 {
    MIN_CONFIRMATIONS
}

impl NetworkConfig {
    /// LUKSO mainnet.
    pub fn lukso() -> Self {
        Self {
            name: "lukso".to_string(),
            chain_id: 42,
            rpc_url: "https://rpc.lukso.gateway.fm".to_string(),
            explorer: Some(ExplorerConfig {
                api_url: "https://api.explorer.execution.mainnet.lukso.network/api".to_string(),
                browser_url: "https://explorer.execution.mainnet.lukso.network/".to_string(),
                api_key: None,
            }),
            confirmations: MIN_CONFIRMATIONS,
            timeout_secs: None,
        }
    }

    /// LUKSO testnet.
    pub fn lukso_testnet() -> Self {
        Self {
            name: "lukso_testnet".to_string(),
            chain_id: 4201,
            rpc_url: "https://rpc.testnet.lukso.gateway.fm".to_string(),
            explorer: Some(ExplorerConfig {
                api_url: "https://api.explorer.execution.testnet.lukso.network/api".to_string(),
                browser_url: "https://explorer.execution.testnet.lukso.network/".to_string(),
                api_key: None,
            }),
            confirmations: MIN_CONFIRMATIONS,
            timeout_secs: None,
        }
    }

    /// A local development node such as anvil or hardhat.
    pub fn localhost() -> Self {
        Self {
            name: "localhost".to_string(),
            chain_id: 31337,
            rpc_url: "http://localhost:8545".to_string(),
            explorer: None,
            confirmations: MIN_CONFIRMATIONS,
            timeout_secs: None,
        }
    }

    /// The networks known without a config file.
    pub fn builtin() -> Vec<Self> {
        vec![Self::lukso(), Self::lukso_testnet(), Self::localhost()]
    }

    /// Confirmation policy derived from this config.
    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        let timeout = self.timeout_secs.map_or(DEFAULT_CONFIRMATION_TIMEOUT, Duration::from_secs);
        ConfirmationPolicy::new(self.confirmations, Some(timeout))
    }

    /// Explorer page of `address`, if the network has an explorer.
    pub fn address_url(&self, address: Address) -> Option<String> {
        let explorer = self.explorer.as_ref()?;
        Some(format!("{}/address/{address}", explorer.browser_url.trim_end_matches('/')))
    }
}

/// Contents of a networks config file.
///
/// ```json
/// { "networks": { "lukso_testnet": { "chainId": 4201, "rpcUrl": "https://…" } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworksFile {
    /// Networks by name.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
}

/// One network in a config file; `name` is taken from the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    /// Expected chain id.
    pub chain_id: u64,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Block explorer, if any.
    #[serde(default)]
    pub explorer: Option<ExplorerConfig>,
    /// Confirmation depth.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Confirmation wait timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl NetworksFile {
    /// Reads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

/// Resolves `name` from the config file first, then the built-in networks.
pub fn resolve_network(
    name: &str,
    file: Option<&NetworksFile>,
) -> Result<NetworkConfig, ConfigError> {
    if let Some(entry) = file.and_then(|file| file.networks.get(name)) {
        return Ok(NetworkConfig {
            name: name.to_string(),
            chain_id: entry.chain_id,
            rpc_url: entry.rpc_url.clone(),
            explorer: entry.explorer.clone(),
            confirmations: entry.confirmations,
            timeout_secs: entry.timeout_secs,
        });
    }

    NetworkConfig::builtin()
        .into_iter()
        .find(|network| network.name == name)
        .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
}
