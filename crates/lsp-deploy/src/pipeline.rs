//! The predict → deploy → confirm → verify flow.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    predict, trigger, ChainClient, DeploymentMode, DeploymentReceipt, InitPayload,
    LinkedDeployment, LinkedOrchestrator, LinkedRoute, NetworkConfig, Result, Salt, Submitter,
    VerificationOutcome, Verifier, VerifyRequest,
};

/// Source identity of a deployed contract, for the verifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTarget {
    /// Source identifier, e.g. `contracts/Foo.sol:Foo`.
    pub contract: String,
    /// Constructor arguments in textual form.
    #[serde(default)]
    pub constructor_values: Vec<String>,
}

/// One contract through the universal factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleDeployment {
    /// The universal factory.
    pub factory: Address,
    /// Creation code and constructor arguments.
    pub payload: InitPayload,
    /// Caller-chosen salt.
    pub salt: Salt,
    /// Plain or initializable deployment.
    pub mode: DeploymentMode,
    /// Verify the contract once deployed.
    pub verification: Option<VerificationTarget>,
}

/// A primary + controller pair through the linked contracts factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedDeploymentRequest {
    /// The linked contracts factory.
    pub factory: Address,
    /// Deployer contract or direct factory call.
    pub route: LinkedRoute,
    /// Caller-chosen salt; zero is valid.
    pub salt: Salt,
    /// Require the primary's `owner()` to be the controller.
    pub check_ownership: bool,
    /// Verify the primary once deployed.
    pub primary_verification: Option<VerificationTarget>,
    /// Verify the controller once deployed. It is assumed to take the primary's address as its
    /// constructor argument.
    pub controller_verification: Option<VerificationTarget>,
}

/// The two deployment strategies. Exactly one applies per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentStrategy {
    /// A single contract.
    Single(SingleDeployment),
    /// A linked primary/controller pair.
    Linked(LinkedDeploymentRequest),
}

/// What was deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "strategy")]
pub enum DeploymentOutcome {
    /// A single contract.
    #[serde(rename_all = "camelCase")]
    Single {
        /// The offline prediction, equal to `receipt.address`.
        predicted: Address,
        /// The confirmed deployment.
        receipt: DeploymentReceipt,
    },
    /// A linked pair.
    Linked {
        /// The confirmed pair.
        deployment: LinkedDeployment,
    },
}

impl DeploymentOutcome {
    /// Addresses of every contract created.
    pub fn addresses(&self) -> Vec<Address> {
        match self {
            Self::Single { receipt, .. } => vec![receipt.address],
            Self::Linked { deployment } => vec![deployment.primary, deployment.controller],
        }
    }
}

/// Verification result of one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    /// The verified contract.
    pub address: Address,
    /// Source identifier that was submitted.
    pub contract: String,
    /// What the verifier answered.
    pub outcome: VerificationOutcome,
}

/// Everything a run produced, ready to be printed as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReport {
    /// Network name.
    pub network: String,
    /// Chain id of the network.
    pub chain_id: u64,
    /// The confirmed deployment.
    pub outcome: DeploymentOutcome,
    /// Explorer pages of the created contracts.
    pub explorer_urls: Vec<String>,
    /// One record per verification attempt.
    pub verification: Vec<VerificationRecord>,
}

/// Runs deployment strategies against one network.
#[derive(Debug)]
pub struct Pipeline<C, V> {
    client: C,
    verifier: V,
    network: NetworkConfig,
}

impl<C: ChainClient, V: Verifier> Pipeline<C, V> {
    /// A pipeline deploying through `client` and verifying with `verifier`.
    pub const fn new(client: C, verifier: V, network: NetworkConfig) -> Self {
        Self { client, verifier, network }
    }

    /// The chain client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The network this pipeline deploys to.
    pub const fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Deploys according to `strategy`, confirms the result and triggers verification.
    ///
    /// Any deployment error stops the run before verification. Verification errors are recorded
    /// in the report and never turn into an `Err`.
    pub async fn run(&self, strategy: &DeploymentStrategy) -> Result<DeploymentReport> {
        let (outcome, requests) = match strategy {
            DeploymentStrategy::Single(single) => self.deploy_single(single).await?,
            DeploymentStrategy::Linked(linked) => self.deploy_linked(linked).await?,
        };

        let mut verification = Vec::with_capacity(requests.len());
        for request in requests {
            let outcome = trigger(&self.verifier, &request).await;
            verification.push(VerificationRecord {
                address: request.address,
                contract: request.contract,
                outcome,
            });
        }

        let explorer_urls = outcome
            .addresses()
            .into_iter()
            .filter_map(|address| self.network.address_url(address))
            .collect();
        Ok(DeploymentReport {
            network: self.network.name.clone(),
            chain_id: self.network.chain_id,
            outcome,
            explorer_urls,
            verification,
        })
    }

    async fn deploy_single(
        &self,
        single: &SingleDeployment,
    ) -> Result<(DeploymentOutcome, Vec<VerifyRequest>)> {
        let predicted = predict(single.factory, &single.payload, single.salt, &single.mode);
        info!(network = %self.network.name, %predicted, "Deploying contract");

        let receipt = Submitter::new(&self.client, self.network.confirmation_policy())
            .submit(single.factory, &single.payload, single.salt, &single.mode)
            .await?;

        let requests = single
            .verification
            .iter()
            .map(|target| {
                self.verify_request(
                    receipt.address,
                    target,
                    Bytes::copy_from_slice(single.payload.constructor_args()),
                )
            })
            .collect();
        Ok((DeploymentOutcome::Single { predicted, receipt }, requests))
    }

    async fn deploy_linked(
        &self,
        linked: &LinkedDeploymentRequest,
    ) -> Result<(DeploymentOutcome, Vec<VerifyRequest>)> {
        info!(
            network = %self.network.name,
            factory = %linked.factory,
            salt = %linked.salt,
            "Deploying linked contracts"
        );

        let deployment = LinkedOrchestrator::new(&self.client, self.network.confirmation_policy())
            .with_factory(linked.factory)
            .with_ownership_check(linked.check_ownership)
            .deploy_linked(&linked.route, linked.salt)
            .await?;

        let controller_args = match &linked.route {
            LinkedRoute::Direct(plan) => {
                let code = plan.controller_init_code(deployment.primary);
                Bytes::copy_from_slice(&code[plan.controller_bytecode.len()..])
            }
            LinkedRoute::Orchestrator { .. } => deployment.primary.abi_encode().into(),
        };
        let mut requests = Vec::new();
        if let Some(target) = &linked.primary_verification {
            requests.push(self.verify_request(deployment.primary, target, Bytes::new()));
        }
        if let Some(target) = &linked.controller_verification {
            let has_args = !controller_args.is_empty();
            let mut request = self.verify_request(deployment.controller, target, controller_args);
            // The primary address is unknown before the deployment.
            if has_args && request.constructor_values.is_empty() {
                request.constructor_values.push(deployment.primary.to_string());
            }
            requests.push(request);
        }
        Ok((DeploymentOutcome::Linked { deployment }, requests))
    }

    fn verify_request(
        &self,
        address: Address,
        target: &VerificationTarget,
        constructor_args: Bytes,
    ) -> VerifyRequest {
        VerifyRequest {
            address,
            network: self.network.name.clone(),
            contract: target.contract.clone(),
            constructor_args,
            constructor_values: target.constructor_values.clone(),
        }
    }
}
