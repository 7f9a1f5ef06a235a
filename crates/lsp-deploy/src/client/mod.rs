//! The network boundary the pipeline talks through.

use std::{future::Future, time::Duration};

use alloy_primitives::{Address, Bytes, Log, TxHash, U256};
use alloy_provider::PendingTransactionError;
use alloy_transport::TransportError;

use crate::{
    constants::{DEFAULT_CONFIRMATION_TIMEOUT, MIN_CONFIRMATIONS},
    DeployError,
};

mod rpc;
pub use rpc::*;

/// A call to a contract, either simulated or sent as a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// The contract being called.
    pub to: Address,
    /// ABI-encoded calldata.
    pub input: Bytes,
    /// Value attached to the call.
    pub value: U256,
}

impl ContractCall {
    /// A call without value.
    pub fn new(to: Address, input: impl Into<Bytes>) -> Self {
        Self { to, input: input.into(), value: U256::ZERO }
    }

    /// Attaches `value` to the call.
    pub const fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// The parts of a mined receipt the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Block that included the transaction.
    pub block_number: u64,
    /// Whether execution succeeded.
    pub success: bool,
    /// Logs emitted by the transaction.
    pub logs: Vec<Log>,
}

/// How long and how deep to wait for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    confirmations: u64,
    timeout: Option<Duration>,
}

impl ConfirmationPolicy {
    /// Waits for `confirmations` blocks (at least one) with an optional timeout.
    pub fn new(confirmations: u64, timeout: Option<Duration>) -> Self {
        Self { confirmations: confirmations.max(MIN_CONFIRMATIONS), timeout }
    }

    /// Required confirmation depth.
    pub const fn confirmations(&self) -> u64 {
        self.confirmations
    }

    /// Maximum time to wait, `None` to wait forever.
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::new(MIN_CONFIRMATIONS, Some(DEFAULT_CONFIRMATION_TIMEOUT))
    }
}

/// Errors raised at the network boundary. The pipeline treats them as transient, except that a
/// rejected simulation ([`ClientError::is_rejection`]) stops a deployment before anything is sent.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// RPC transport error
    #[error("RPC transport error: {0}")]
    Transport(#[from] TransportError),

    /// Waiting for the transaction failed or timed out
    #[error("pending transaction error: {0}")]
    Pending(#[from] PendingTransactionError),

    /// The node rejected the request
    #[error("RPC error: {0}")]
    Rpc(String),
}

impl ClientError {
    /// Whether the node answered with an error response (e.g. an `eth_call` that reverted)
    /// rather than failing to answer at all.
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::Transport(err) => err.as_error_resp().is_some(),
            Self::Pending(_) => false,
            Self::Rpc(_) => true,
        }
    }
}

/// Read and write access to one chain.
///
/// Implementations must keep nonces of one signing credential strictly sequential; the pipeline
/// never reorders transactions itself. Dropping a pending [`ChainClient::send`] future abandons
/// the wait, not the transaction.
pub trait ChainClient: Send + Sync {
    /// Chain id the endpoint serves.
    fn chain_id(&self) -> impl Future<Output = Result<u64, ClientError>> + Send;

    /// Runtime code at `address`, empty for accounts without code.
    fn code_at(&self, address: Address) -> impl Future<Output = Result<Bytes, ClientError>> + Send;

    /// Simulates `call` against the latest state and returns its output.
    fn call(&self, call: ContractCall) -> impl Future<Output = Result<Bytes, ClientError>> + Send;

    /// Signs and sends `call`, then waits according to `policy`.
    fn send(
        &self,
        call: ContractCall,
        policy: ConfirmationPolicy,
    ) -> impl Future<Output = Result<ChainReceipt, ClientError>> + Send;
}

/// Fails with [`DeployError::ChainIdMismatch`] unless `client` serves chain `expected`.
pub async fn ensure_chain_id<C: ChainClient>(client: &C, expected: u64) -> Result<(), DeployError> {
    let actual = client.chain_id().await?;
    if actual != expected {
        return Err(DeployError::ChainIdMismatch { expected, actual });
    }
    Ok(())
}
