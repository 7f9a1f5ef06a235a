use alloy_primitives::{Address, TxHash};

use crate::{ClientError, PayloadError};

/// Errors that stop a deployment.
///
/// Only [`DeployError::Submission`] is worth retrying; everything else means the deployment
/// deviated from its design and must not proceed to verification.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The chain created a contract somewhere other than the predicted address
    #[error("predicted address {predicted} but the chain reported {actual}")]
    PredictionMismatch {
        /// Address computed offline
        predicted: Address,
        /// Address reported by the chain
        actual: Address,
    },

    /// The (factory, payload, salt) triple was already used
    #[error("a contract is already deployed at {address}")]
    AlreadyDeployed {
        /// The occupied address
        address: Address,
    },

    /// The factory has no code on the target network
    #[error("no factory contract deployed at {address}")]
    FactoryUnavailable {
        /// The expected factory address
        address: Address,
    },

    /// Transient RPC or confirmation failure
    #[error("submission failed: {0}")]
    Submission(#[from] ClientError),

    /// The deployment transaction was mined but reverted
    #[error("deployment transaction {tx_hash} reverted")]
    Reverted {
        /// Hash of the reverted transaction
        tx_hash: TxHash,
    },

    /// Simulating the deployment call reverted, so nothing was sent
    #[error("simulated call to {target} reverted: {reason}")]
    SimulationReverted {
        /// Contract that was called
        target: Address,
        /// Error reported by the node
        reason: String,
    },

    /// The init payload could not be formed
    #[error("invalid init payload: {0}")]
    Payload(#[from] PayloadError),

    /// The receipt does not carry the factory's creation event
    #[error("transaction {tx_hash} did not emit a creation event from {factory}")]
    MissingEvent {
        /// Hash of the deployment transaction
        tx_hash: TxHash,
        /// Factory expected to emit the event
        factory: Address,
    },

    /// The primary contract is not governed by the controller deployed with it
    #[error("primary {primary} is owned by {actual}, expected controller {expected}")]
    LinkMismatch {
        /// The primary contract
        primary: Address,
        /// The controller deployed alongside it
        expected: Address,
        /// The owner the primary actually reports
        actual: Address,
    },

    /// The linked factory returned a degenerate pair
    #[error("linked deployment produced an invalid pair ({primary}, {controller})")]
    InvalidLinkedPair {
        /// Reported primary
        primary: Address,
        /// Reported controller
        controller: Address,
    },

    /// The RPC endpoint serves a different chain than configured
    #[error("RPC endpoint reports chain {actual}, network is configured for {expected}")]
    ChainIdMismatch {
        /// Chain id from the network config
        expected: u64,
        /// Chain id reported by the endpoint
        actual: u64,
    },

    /// Return data or event data could not be decoded
    #[error("ABI decoding failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),
}

impl DeployError {
    /// Whether the caller may retry the same request.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Submission(_))
    }
}

/// Result type for deployment operations.
pub type Result<T, E = DeployError> = std::result::Result<T, E>;
