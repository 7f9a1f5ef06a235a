//! Record of past deployments per network.
//!
//! The same logical contract is usually deployed with a fixed salt on every network. When its
//! payload changes, the salt no longer reproduces the recorded address; the ledger refuses such a
//! deployment instead of quietly producing a second address under the same name.

use std::{collections::BTreeMap, fs, io, path::Path};

use alloy_primitives::{Address, TxHash, B256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DeployError, Salt};

/// Errors raised while reading or writing a ledger file.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger file could not be read or written
    #[error("ledger file error: {0}")]
    Io(#[from] io::Error),

    /// The ledger file is not valid ledger JSON
    #[error("malformed ledger: {0}")]
    Json(#[from] serde_json::Error),
}

/// One recorded deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Salt the contract was deployed with.
    pub salt: Salt,
    /// `keccak256` of the init payload.
    pub payload_hash: B256,
    /// Confirmed address.
    pub address: Address,
    /// Deployment transaction.
    pub tx_hash: TxHash,
    /// Block that included the deployment.
    pub block_number: u64,
}

/// Deployments of one network by contract identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentLedger {
    #[serde(default)]
    contracts: BTreeMap<String, LedgerEntry>,
}

impl DeploymentLedger {
    /// Reads the ledger at `path`; a missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the ledger to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The recorded deployment of `contract`.
    pub fn get(&self, contract: &str) -> Option<&LedgerEntry> {
        self.contracts.get(contract)
    }

    /// Checks a planned deployment of `contract` with `salt` to `predicted`.
    ///
    /// Fails with [`DeployError::PredictionMismatch`] when the same contract was already
    /// deployed with the same salt to a different address, i.e. from a different payload.
    pub fn check(&self, contract: &str, salt: Salt, predicted: Address) -> Result<(), DeployError> {
        match self.contracts.get(contract) {
            Some(entry) if entry.salt == salt && entry.address != predicted => {
                Err(DeployError::PredictionMismatch { predicted: entry.address, actual: predicted })
            }
            _ => Ok(()),
        }
    }

    /// Records a confirmed deployment of `contract`, replacing any previous entry.
    pub fn record(&mut self, contract: impl Into<String>, entry: LedgerEntry) {
        let contract = contract.into();
        debug!(%contract, address = %entry.address, "Recording deployment");
        self.contracts.insert(contract, entry);
    }
}
