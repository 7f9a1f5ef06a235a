use alloy_signer_local::LocalSignerError;
use lsp_deploy::{ConfigError, DeployError, LedgerError, PayloadError};

/// Error types shared by all lsp-deployer commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Deployment error
    #[error("Deployment failed: {0}")]
    Deploy(#[from] DeployError),

    /// Network configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Init payload error
    #[error("Invalid payload: {0}")]
    Payload(#[from] PayloadError),

    /// Deployment ledger could not be read or written
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidKey(#[from] LocalSignerError),

    /// Failed to read or write a file
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the report
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Logging setup failed
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// Source verification did not succeed
    #[error("Verification failed: {0}")]
    Verification(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the lsp-deployer commands
pub type Result<T> = std::result::Result<T, CliError>;
