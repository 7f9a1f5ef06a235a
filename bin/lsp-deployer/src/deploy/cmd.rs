use std::{
    io::Write,
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use clap::Parser;
use lsp_deploy::{
    connect, constants::UNIVERSAL_FACTORY_ADDRESS, predict, ChainClient, DeploymentLedger,
    DeploymentOutcome, DeploymentReport, DeploymentStrategy, LedgerEntry, NetworkConfig, Pipeline,
    SingleDeployment, VerificationTarget, Verifier,
};

use tracing::debug;

use super::Result;
use crate::common::{DeploymentArgs, KeyArgs, LogArgs, NetworkArgs, PayloadArgs, VerifierArgs};

/// Deploy a single contract through the universal factory
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Contract identifier, e.g. `contracts/Foo.sol:Foo`. Keys the ledger and names the source
    /// for verification
    #[arg(long = "contract")]
    pub contract: String,

    /// Init payload
    #[command(flatten)]
    pub payload_args: PayloadArgs,

    /// Salt and factory mode
    #[command(flatten)]
    pub deployment_args: DeploymentArgs,

    /// Universal factory address
    #[arg(long = "factory", default_value_t = UNIVERSAL_FACTORY_ADDRESS)]
    pub factory: Address,

    /// Deployment ledger, `deployments/<network>.json` by default
    #[arg(long = "ledger")]
    pub ledger: Option<PathBuf>,

    /// Network selection
    #[command(flatten)]
    pub network_args: NetworkArgs,

    /// Signing key
    #[command(flatten)]
    pub key_args: KeyArgs,

    /// Verification
    #[command(flatten)]
    pub verifier_args: VerifierArgs,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the deploy command
    pub async fn run(&self) -> Result<()> {
        self.log_args.init()?;

        let network = self.network_args.resolve()?;
        let verifier = self.verifier_args.build(&network)?;
        let ledger_path = self.ledger_path(&network);
        let mut ledger = DeploymentLedger::load(&ledger_path)?;

        let client = connect(&network, self.key_args.signer()?).await?;
        let pipeline = Pipeline::new(client, verifier, network);
        let report = self.execute(&pipeline, &mut ledger).await?;

        self.finish(&report, &ledger, &ledger_path, &mut std::io::stdout().lock())
    }

    /// Writes `report` to `out`, then saves `ledger` to `path`. A failed save is reported after
    /// the report has been written.
    pub fn finish(
        &self,
        report: &DeploymentReport,
        ledger: &DeploymentLedger,
        path: &Path,
        out: &mut impl Write,
    ) -> Result<()> {
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        ledger.save(path)?;
        debug!(contract = %self.contract, path = %path.display(), "Ledger saved");
        Ok(())
    }

    /// The ledger file for `network`.
    pub fn ledger_path(&self, network: &NetworkConfig) -> PathBuf {
        self.ledger
            .clone()
            .unwrap_or_else(|| PathBuf::from("deployments").join(format!("{}.json", network.name)))
    }

    /// The deployment described by the arguments.
    pub fn single_deployment(&self) -> Result<SingleDeployment> {
        let verification = self.verifier_args.is_enabled().then(|| VerificationTarget {
            contract: self.contract.clone(),
            constructor_values: self.payload_args.args.clone(),
        });
        Ok(SingleDeployment {
            factory: self.factory,
            payload: self.payload_args.payload()?,
            salt: self.deployment_args.salt(),
            mode: self.deployment_args.mode(),
            verification,
        })
    }

    /// Check the ledger, run the pipeline and record the result.
    pub async fn execute<C: ChainClient, V: Verifier>(
        &self,
        pipeline: &Pipeline<C, V>,
        ledger: &mut DeploymentLedger,
    ) -> Result<DeploymentReport> {
        let deployment = self.single_deployment()?;
        let predicted =
            predict(deployment.factory, &deployment.payload, deployment.salt, &deployment.mode);
        eprintln!("Predicted address: {predicted}");
        if let Some(url) = pipeline.network().address_url(predicted) {
            eprintln!("Explorer: {url}");
        }

        ledger.check(&self.contract, deployment.salt, predicted)?;
        let report = pipeline.run(&DeploymentStrategy::Single(deployment.clone())).await?;

        if let DeploymentOutcome::Single { receipt, .. } = report.outcome {
            ledger.record(
                self.contract.as_str(),
                LedgerEntry {
                    salt: deployment.salt,
                    payload_hash: deployment.payload.hash(),
                    address: receipt.address,
                    tx_hash: receipt.tx_hash,
                    block_number: receipt.block_number,
                },
            );
        }
        Ok(report)
    }
}
