use std::{fs, path::PathBuf};

use clap::{Parser, ValueEnum};
use lsp_deploy::{
    CommandVerifier, ExplorerVerifier, NetworkConfig, NoopVerifier, SourceBundle,
    VerificationError, VerificationOutcome, Verifier, VerifyRequest,
};

use super::{CliError, Result};

/// How deployed sources are verified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum VerifierKind {
    /// Do not verify
    #[default]
    None,
    /// Run an external command, `npx hardhat verify` by default
    Command,
    /// Submit standard JSON input to the network's explorer API
    Explorer,
}

/// Verification configuration
#[derive(Parser, Debug, Clone, Default)]
pub struct VerifierArgs {
    /// Verification backend
    #[arg(long = "verifier", value_enum, default_value_t = VerifierKind::None)]
    pub verifier: VerifierKind,

    /// Command template for `--verifier command`; supports {address}, {network}, {contract},
    /// {constructorArgs} and {args}
    #[arg(long = "verify.command")]
    pub command: Option<String>,

    /// Solidity standard JSON input for `--verifier explorer`
    #[arg(long = "verify.standard-json")]
    pub standard_json: Option<PathBuf>,

    /// Full compiler version for `--verifier explorer`, e.g. v0.8.17+commit.8df45f5f
    #[arg(long = "verify.compiler")]
    pub compiler_version: Option<String>,
}

impl VerifierArgs {
    /// Whether any verification is requested.
    pub fn is_enabled(&self) -> bool {
        self.verifier != VerifierKind::None
    }

    /// Build the selected verifier for `network`.
    pub fn build(&self, network: &NetworkConfig) -> Result<AnyVerifier> {
        match self.verifier {
            VerifierKind::None => Ok(AnyVerifier::Noop(NoopVerifier)),
            VerifierKind::Command => {
                let verifier = match &self.command {
                    Some(template) => CommandVerifier::from_template(template).ok_or_else(|| {
                        CliError::InvalidInput("--verify.command is empty".to_string())
                    })?,
                    None => CommandVerifier::hardhat(),
                };
                Ok(AnyVerifier::Command(verifier))
            }
            VerifierKind::Explorer => {
                let explorer = network.explorer.as_ref().ok_or_else(|| {
                    CliError::InvalidInput(format!("network '{}' has no explorer", network.name))
                })?;
                let (Some(input), Some(compiler_version)) =
                    (&self.standard_json, &self.compiler_version)
                else {
                    return Err(CliError::InvalidInput(
                        "--verify.standard-json and --verify.compiler are required".to_string(),
                    ));
                };
                let source = SourceBundle {
                    standard_json_input: fs::read_to_string(input)?,
                    compiler_version: compiler_version.clone(),
                };
                Ok(AnyVerifier::Explorer(ExplorerVerifier::new(explorer, source)))
            }
        }
    }
}

/// One of the verifiers selectable from the command line
#[derive(Debug, Clone)]
pub enum AnyVerifier {
    /// Verification disabled
    Noop(NoopVerifier),
    /// External command
    Command(CommandVerifier),
    /// Explorer API
    Explorer(ExplorerVerifier),
}

impl Verifier for AnyVerifier {
    async fn verify(
        &self,
        request: &VerifyRequest,
    ) -> std::result::Result<VerificationOutcome, VerificationError> {
        match self {
            Self::Noop(verifier) => verifier.verify(request).await,
            Self::Command(verifier) => verifier.verify(request).await,
            Self::Explorer(verifier) => verifier.verify(request).await,
        }
    }
}
