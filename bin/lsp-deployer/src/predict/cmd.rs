use alloy_primitives::Address;
use clap::Parser;
use lsp_deploy::{constants::UNIVERSAL_FACTORY_ADDRESS, predict, resolve_network};

use super::Result;
use crate::common::{DeploymentArgs, LogArgs, PayloadArgs};

/// Compute the address a universal factory deployment will land on
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Init payload
    #[command(flatten)]
    pub payload_args: PayloadArgs,

    /// Salt and factory mode
    #[command(flatten)]
    pub deployment_args: DeploymentArgs,

    /// Universal factory address
    #[arg(long = "factory", default_value_t = UNIVERSAL_FACTORY_ADDRESS)]
    pub factory: Address,

    /// Also print the explorer link on this built-in network
    #[arg(long = "network", short = 'n')]
    pub network: Option<String>,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the predict command
    pub fn run(&self) -> Result<()> {
        self.log_args.init()?;

        let address = self.predicted_address()?;
        println!("{address}");
        if let Some(name) = &self.network {
            if let Some(url) = resolve_network(name, None)?.address_url(address) {
                println!("{url}");
            }
        }
        Ok(())
    }

    /// The predicted address, without touching any network.
    pub fn predicted_address(&self) -> Result<Address> {
        let payload = self.payload_args.payload()?;
        Ok(predict(
            self.factory,
            &payload,
            self.deployment_args.salt(),
            &self.deployment_args.mode(),
        ))
    }
}
