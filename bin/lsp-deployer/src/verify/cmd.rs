use alloy_primitives::Address;
use clap::Parser;
use lsp_deploy::{
    encode_constructor_args, trigger, NetworkConfig, VerificationOutcome, Verifier, VerifyRequest,
};

use super::{Result, VerifyCmdError};
use crate::common::{LogArgs, NetworkArgs, VerifierArgs};

/// Trigger source verification of an already deployed contract
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Address of the deployed contract
    #[arg(value_name = "ADDRESS")]
    pub address: Address,

    /// Source identifier, e.g. `contracts/Foo.sol:Foo`
    #[arg(long = "contract")]
    pub contract: String,

    /// Constructor parameter types, e.g. `address,uint256`
    #[arg(long = "constructor", default_value = "")]
    pub constructor: String,

    /// Constructor argument, repeated once per parameter
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Network selection
    #[command(flatten)]
    pub network_args: NetworkArgs,

    /// Verification
    #[command(flatten)]
    pub verifier_args: VerifierArgs,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the verify command
    pub async fn run(&self) -> Result<()> {
        self.log_args.init()?;

        if !self.verifier_args.is_enabled() {
            return Err(VerifyCmdError::InvalidInput(
                "--verifier command or --verifier explorer is required".to_string(),
            ));
        }
        let network = self.network_args.resolve()?;
        let verifier = self.verifier_args.build(&network)?;
        let outcome = self.execute(&verifier, &network).await?;

        println!("{}", serde_json::to_string_pretty(&outcome)?);
        match outcome {
            VerificationOutcome::Failed { reason } => Err(VerifyCmdError::Verification(reason)),
            _ => Ok(()),
        }
    }

    /// The verification request described by the arguments.
    pub fn request(&self, network: &NetworkConfig) -> Result<VerifyRequest> {
        Ok(VerifyRequest {
            address: self.address,
            network: network.name.clone(),
            contract: self.contract.clone(),
            constructor_args: encode_constructor_args(&self.constructor, &self.args)?,
            constructor_values: self.args.clone(),
        })
    }

    /// Run `verifier` for the contract.
    pub async fn execute<V: Verifier>(
        &self,
        verifier: &V,
        network: &NetworkConfig,
    ) -> Result<VerificationOutcome> {
        Ok(trigger(verifier, &self.request(network)?).await)
    }
}
