use std::path::{Path, PathBuf};

use alloy_primitives::{Address, Bytes, B256, U256};
use clap::Parser;
use lsp_deploy::{
    compute_linked_addresses, connect, constants::LINKED_CONTRACTS_FACTORY_ADDRESS,
    load_creation_code, ChainClient, DeploymentReport, DeploymentStrategy, LinkedDeploymentPlan,
    LinkedDeploymentRequest, LinkedRoute, Pipeline, VerificationTarget, Verifier,
};

use super::{DeployLinkedError, Result};
use crate::common::{KeyArgs, LogArgs, NetworkArgs, VerifierArgs};

/// Deploy a primary contract and its controller in one transaction
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Deployer contract that calls the linked factory with a built-in plan
    #[arg(long = "deployer", conflicts_with_all = ["primary_bytecode", "primary_artifact"])]
    pub deployer: Option<Address>,

    /// Plan for calling the linked factory directly
    #[command(flatten)]
    pub plan_args: LinkedPlanArgs,

    /// 32-byte salt, zero when omitted
    #[arg(long = "salt")]
    pub salt: Option<B256>,

    /// Linked contracts factory address
    #[arg(long = "factory", default_value_t = LINKED_CONTRACTS_FACTORY_ADDRESS)]
    pub factory: Address,

    /// Do not require the primary's `owner()` to be the controller
    #[arg(long = "no-ownership-check")]
    pub no_ownership_check: bool,

    /// Source identifier of the primary contract, for verification
    #[arg(long = "primary-contract")]
    pub primary_contract: Option<String>,

    /// Source identifier of the controller contract, for verification
    #[arg(long = "controller-contract")]
    pub controller_contract: Option<String>,

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

/// Contracts and funding of a direct linked factory call
#[derive(Parser, Debug, Clone, Default)]
pub struct LinkedPlanArgs {
    /// Primary creation bytecode as a hex string
    #[arg(long = "primary-bytecode", conflicts_with = "primary_artifact")]
    pub primary_bytecode: Option<Bytes>,

    /// Artifact or hex file with the primary creation bytecode
    #[arg(long = "primary-artifact")]
    pub primary_artifact: Option<PathBuf>,

    /// Value forwarded to the primary's constructor, in wei
    #[arg(long = "primary-funding", default_value = "0")]
    pub primary_funding: U256,

    /// Controller creation bytecode as a hex string
    #[arg(long = "controller-bytecode", conflicts_with = "controller_artifact")]
    pub controller_bytecode: Option<Bytes>,

    /// Artifact or hex file with the controller creation bytecode
    #[arg(long = "controller-artifact")]
    pub controller_artifact: Option<PathBuf>,

    /// Value forwarded to the controller's constructor, in wei
    #[arg(long = "controller-funding", default_value = "0")]
    pub controller_funding: U256,

    /// Pass the primary address as the controller's first constructor argument
    #[arg(long = "add-primary-address")]
    pub add_primary_address: bool,

    /// ABI-encoded constructor parameters appended after the primary address
    #[arg(long = "extra-params")]
    pub extra_params: Option<Bytes>,

    /// Contract called once both contracts exist
    #[arg(long = "post-deployment-module", default_value_t = Address::ZERO)]
    pub post_deployment_module: Address,

    /// Calldata for the post-deployment module
    #[arg(long = "post-deployment-calldata")]
    pub post_deployment_calldata: Option<Bytes>,
}

impl LinkedPlanArgs {
    /// Build the deployment plan.
    pub fn plan(&self) -> Result<LinkedDeploymentPlan> {
        let primary_bytecode = Self::code(
            "primary",
            self.primary_bytecode.as_ref(),
            self.primary_artifact.as_deref(),
        )?;
        let controller_bytecode = Self::code(
            "controller",
            self.controller_bytecode.as_ref(),
            self.controller_artifact.as_deref(),
        )?;
        Ok(LinkedDeploymentPlan {
            primary_bytecode,
            primary_funding: self.primary_funding,
            controller_bytecode,
            controller_funding: self.controller_funding,
            add_primary_address: self.add_primary_address,
            extra_constructor_params: self.extra_params.clone().unwrap_or_default(),
            post_deployment_module: self.post_deployment_module,
            post_deployment_calldata: self.post_deployment_calldata.clone().unwrap_or_default(),
        })
    }

    fn code(which: &str, bytecode: Option<&Bytes>, artifact: Option<&Path>) -> Result<Bytes> {
        match (bytecode, artifact) {
            (Some(code), _) => Ok(code.clone()),
            (None, Some(path)) => Ok(load_creation_code(path)?),
            (None, None) => Err(DeployLinkedError::InvalidInput(format!(
                "--{which}-bytecode or --{which}-artifact is required without --deployer"
            ))),
        }
    }
}

impl Cmd {
    /// Execute the deploy-linked command
    pub async fn run(&self) -> Result<()> {
        self.log_args.init()?;

        let network = self.network_args.resolve()?;
        let verifier = self.verifier_args.build(&network)?;
        let client = connect(&network, self.key_args.signer()?).await?;
        let report = self.execute(&Pipeline::new(client, verifier, network)).await?;

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    /// The linked deployment described by the arguments.
    pub fn request(&self) -> Result<LinkedDeploymentRequest> {
        let route = match self.deployer {
            Some(deployer) => LinkedRoute::Orchestrator { deployer },
            None => LinkedRoute::Direct(self.plan_args.plan()?),
        };
        let target = |contract: Option<&String>| {
            contract.filter(|_| self.verifier_args.is_enabled()).map(|contract| {
                VerificationTarget { contract: contract.clone(), ..Default::default() }
            })
        };
        Ok(LinkedDeploymentRequest {
            factory: self.factory,
            route,
            salt: self.salt.unwrap_or_default(),
            check_ownership: !self.no_ownership_check,
            primary_verification: target(self.primary_contract.as_ref()),
            controller_verification: target(self.controller_contract.as_ref()),
        })
    }

    /// Run the linked deployment through `pipeline`.
    pub async fn execute<C: ChainClient, V: Verifier>(
        &self,
        pipeline: &Pipeline<C, V>,
    ) -> Result<DeploymentReport> {
        let request = self.request()?;
        if let LinkedRoute::Direct(plan) = &request.route {
            let pair = compute_linked_addresses(request.factory, plan, request.salt);
            eprintln!("Predicted primary: {}", pair.primary);
            eprintln!("Predicted controller: {}", pair.controller);
        }
        Ok(pipeline.run(&DeploymentStrategy::Linked(request)).await?)
    }
}
