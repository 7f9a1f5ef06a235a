//! Best-effort source verification after a deployment.
//!
//! A verifier never influences the deployment it is asked about: [`trigger`] turns every error
//! into a [`VerificationOutcome::Failed`] and logs it.

use std::future::Future;

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

mod command;
pub use command::*;

mod explorer;
pub use explorer::*;

/// What a verifier needs to know about one deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// The confirmed contract address.
    pub address: Address,
    /// Network name, as used by the configuration.
    pub network: String,
    /// Source identifier, e.g. `contracts/Foo.sol:Foo`.
    pub contract: String,
    /// ABI-encoded constructor arguments.
    pub constructor_args: Bytes,
    /// The same arguments in their textual form, for tools that re-encode them.
    #[serde(default)]
    pub constructor_values: Vec<String>,
}

/// Result of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum VerificationOutcome {
    /// The source is verified, either now or before.
    Verified,
    /// No verification was attempted.
    Skipped,
    /// Verification failed; the deployment is unaffected.
    Failed {
        /// Human-readable reason.
        reason: String,
    },
}

impl VerificationOutcome {
    /// Whether the source ended up verified.
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Errors raised by verifiers.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The verification command could not be started
    #[error("failed to run verification command: {0}")]
    Spawn(#[from] std::io::Error),

    /// The verification command exited unsuccessfully
    #[error("verification command exited with {status}: {output}")]
    CommandFailed {
        /// Exit status description
        status: String,
        /// Captured stderr, or stdout if stderr was empty
        output: String,
    },

    /// The explorer API could not be reached
    #[error("explorer request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The explorer rejected the submission
    #[error("explorer rejected verification: {0}")]
    Rejected(String),

    /// The explorer did not finish within the polling budget
    #[error("verification still pending after {attempts} status checks")]
    Timeout {
        /// Number of status checks performed
        attempts: u32,
    },
}

/// An external source verification service.
pub trait Verifier: Send + Sync {
    /// Submits `request` and waits for the service's answer.
    fn verify(
        &self,
        request: &VerifyRequest,
    ) -> impl Future<Output = Result<VerificationOutcome, VerificationError>> + Send;
}

impl<V: Verifier> Verifier for &V {
    fn verify(
        &self,
        request: &VerifyRequest,
    ) -> impl Future<Output = Result<VerificationOutcome, VerificationError>> + Send {
        (**self).verify(request)
    }
}

/// Verifier that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVerifier;

impl Verifier for NoopVerifier {
    async fn verify(
        &self,
        _request: &VerifyRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        Ok(VerificationOutcome::Skipped)
    }
}

/// Runs `verifier` and folds any error into [`VerificationOutcome::Failed`].
pub async fn trigger<V: Verifier>(verifier: &V, request: &VerifyRequest) -> VerificationOutcome {
    match verifier.verify(request).await {
        Ok(outcome) => {
            info!(
                address = %request.address,
                contract = %request.contract,
                ?outcome,
                "Verification finished"
            );
            outcome
        }
        Err(err) => {
            warn!(
                address = %request.address,
                contract = %request.contract,
                %err,
                "Verification failed"
            );
            VerificationOutcome::Failed { reason: err.to_string() }
        }
    }
}

/// Whether a verifier's message says the contract was verified earlier.
pub(crate) fn is_already_verified(message: &str) -> bool {
    message.to_ascii_lowercase().contains("already verified")
}
