use clap::Parser;

/// Main command enumeration for the lsp-deployer CLI tool
#[derive(Parser, Debug)]
#[command(infer_subcommands = true, version)]
#[allow(clippy::large_enum_variant)]
pub enum MainCmd {
    /// Compute a deployment address offline
    Predict(crate::predict::Cmd),
    /// Deploy a single contract through the universal factory
    Deploy(crate::deploy::Cmd),
    /// Deploy a primary contract and its controller through the linked contracts factory
    DeployLinked(crate::deploy_linked::Cmd),
    /// Trigger source verification of an already deployed contract
    Verify(crate::verify::Cmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Any command error
    #[error("{0}")]
    Cli(#[from] crate::common::CliError),
}

impl MainCmd {
    /// Execute the main command
    pub async fn run(&self) -> Result<(), Error> {
        match self {
            Self::Predict(cmd) => cmd.run()?,
            Self::Deploy(cmd) => cmd.run().await?,
            Self::DeployLinked(cmd) => cmd.run().await?,
            Self::Verify(cmd) => cmd.run().await?,
        }
        Ok(())
    }
}
