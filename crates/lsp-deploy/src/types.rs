use alloy_primitives::{Address, Bytes, TxHash, B256};
use serde::{Deserialize, Serialize};

/// Caller-chosen 32-byte differentiator. The zero value means "no additional entropy".
pub type Salt = B256;

/// How the universal factory is asked to create the contract.
///
/// The mode is part of the factory's salt derivation, so the same payload and salt land on
/// different addresses under different modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DeploymentMode {
    /// Plain CREATE2 of the init payload (`deployCreate2`).
    #[default]
    Create2,
    /// CREATE2 followed by an initialize call in the same transaction
    /// (`deployCreate2AndInitialize`).
    Create2AndInitialize {
        /// Calldata the factory forwards to the new contract.
        calldata: Bytes,
    },
}

impl DeploymentMode {
    /// Whether the factory treats the deployment as initializable.
    pub const fn is_initializable(&self) -> bool {
        matches!(self, Self::Create2AndInitialize { .. })
    }

    /// The initialize calldata, empty for plain CREATE2.
    pub fn initialize_calldata(&self) -> Bytes {
        match self {
            Self::Create2 => Bytes::new(),
            Self::Create2AndInitialize { calldata } => calldata.clone(),
        }
    }
}

/// Result of a confirmed single-contract deployment.
///
/// Only ever built after the created address was checked against the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReceipt {
    /// Hash of the deployment transaction.
    pub tx_hash: TxHash,
    /// Block that included the transaction.
    pub block_number: u64,
    /// Confirmation depth that was awaited.
    pub confirmations: u64,
    /// Address the chain assigned to the new contract.
    pub address: Address,
}

/// A primary contract and the controller bound to it, created in one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedDeployment {
    /// The governed contract (e.g. a Universal Profile).
    pub primary: Address,
    /// The contract governing `primary` (e.g. its Key Manager).
    pub controller: Address,
    /// Hash of the orchestrating transaction.
    pub tx_hash: TxHash,
    /// Block that included the transaction.
    pub block_number: u64,
}

/// The pair of addresses a linked deployment is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAddresses {
    /// Expected primary contract address.
    pub primary: Address,
    /// Expected controller contract address.
    pub controller: Address,
}
