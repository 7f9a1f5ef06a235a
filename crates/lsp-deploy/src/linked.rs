//! Primary + controller deployments through the linked contracts factory.

use alloy_primitives::Address;
use alloy_sol_types::{SolCall, SolEvent};
use tracing::{debug, info, warn};

use crate::{
    compute_linked_addresses, constants::LINKED_CONTRACTS_FACTORY_ADDRESS,
    submit::ensure_deployed, ChainClient, ChainReceipt, ConfirmationPolicy, ContractCall,
    DeployError, ILSP23LinkedContractsFactory, ILinkedDeployer, IOwnable, LinkedAddresses,
    LinkedDeployment, LinkedDeploymentPlan, Result, Salt,
};

/// How the linked deployment transaction reaches the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedRoute {
    /// Through a deployer contract that holds the pair's bytecode and forwards `deploy(salt)` to
    /// the factory.
    Orchestrator {
        /// The deployer contract.
        deployer: Address,
    },
    /// Straight to the factory's `deployContracts`.
    Direct(LinkedDeploymentPlan),
}

/// The primary half of `plan` as the factory expects it.
pub fn primary_deployment(
    plan: &LinkedDeploymentPlan,
    salt: Salt,
) -> ILSP23LinkedContractsFactory::PrimaryContractDeployment {
    ILSP23LinkedContractsFactory::PrimaryContractDeployment {
        salt,
        fundingAmount: plan.primary_funding,
        creationBytecode: plan.primary_bytecode.clone(),
    }
}

/// The controller half of `plan` as the factory expects it.
pub fn secondary_deployment(
    plan: &LinkedDeploymentPlan,
) -> ILSP23LinkedContractsFactory::SecondaryContractDeployment {
    ILSP23LinkedContractsFactory::SecondaryContractDeployment {
        fundingAmount: plan.controller_funding,
        creationBytecode: plan.controller_bytecode.clone(),
        addPrimaryContractAddress: plan.add_primary_address,
        extraConstructorParams: plan.extra_constructor_params.clone(),
    }
}

/// The pair announced by the factory's `DeployedContracts` event in `receipt`.
pub fn deployed_pair(factory: Address, receipt: &ChainReceipt) -> Result<LinkedAddresses> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == factory)
        .find_map(|log| {
            ILSP23LinkedContractsFactory::DeployedContracts::decode_log_data(&log.data, true).ok()
        })
        .map(|event| LinkedAddresses {
            primary: event.primaryContract,
            controller: event.secondaryContract,
        })
        .ok_or(DeployError::MissingEvent { tx_hash: receipt.tx_hash, factory })
}

/// Drives a linked deployment and checks the resulting pair.
///
/// Neither the factory's event nor a deployer's return values are taken on trust: the pair must
/// be distinct and non-zero, and with ownership checks enabled the primary must report the
/// controller as its owner.
#[derive(Debug)]
pub struct LinkedOrchestrator<'a, C> {
    client: &'a C,
    policy: ConfirmationPolicy,
    factory: Address,
    check_ownership: bool,
}

impl<'a, C: ChainClient> LinkedOrchestrator<'a, C> {
    /// Orchestrator for the canonical linked contracts factory.
    pub const fn new(client: &'a C, policy: ConfirmationPolicy) -> Self {
        Self { client, policy, factory: LINKED_CONTRACTS_FACTORY_ADDRESS, check_ownership: true }
    }

    /// Uses the factory at `factory` instead.
    pub const fn with_factory(mut self, factory: Address) -> Self {
        self.factory = factory;
        self
    }

    /// Enables or disables the `owner()` check on the primary.
    pub const fn with_ownership_check(mut self, enabled: bool) -> Self {
        self.check_ownership = enabled;
        self
    }

    /// The factory this orchestrator deploys through.
    pub const fn factory(&self) -> Address {
        self.factory
    }

    /// Runs the linked deployment for `salt`.
    ///
    /// The direct route predicts the pair offline, the deployer route gets it from an `eth_call`
    /// of `deploy(salt)`. Either way nothing is sent when the primary already exists or the
    /// simulation reverts, and the factory's event must announce exactly the expected pair.
    pub async fn deploy_linked(&self, route: &LinkedRoute, salt: Salt) -> Result<LinkedDeployment> {
        ensure_deployed(self.client, self.factory).await?;

        let (call, expected) = match route {
            LinkedRoute::Orchestrator { deployer } => {
                ensure_deployed(self.client, *deployer).await?;
                let call =
                    ContractCall::new(*deployer, ILinkedDeployer::deployCall { salt }.abi_encode());
                let expected = self.simulate(&call).await?;
                debug!(
                    %deployer,
                    %salt,
                    primary = %expected.primary,
                    controller = %expected.controller,
                    "Simulated linked deployment"
                );
                (call, expected)
            }
            LinkedRoute::Direct(plan) => {
                let expected = compute_linked_addresses(self.factory, plan, salt);
                debug!(
                    factory = %self.factory,
                    %salt,
                    primary = %expected.primary,
                    controller = %expected.controller,
                    "Predicted linked addresses"
                );
                let input = ILSP23LinkedContractsFactory::deployContractsCall {
                    primaryContractDeployment: primary_deployment(plan, salt),
                    secondaryContractDeployment: secondary_deployment(plan),
                    postDeploymentModule: plan.post_deployment_module,
                    postDeploymentModuleCalldata: plan.post_deployment_calldata.clone(),
                }
                .abi_encode();
                let call = ContractCall::new(self.factory, input).with_value(plan.total_funding());
                (call, expected)
            }
        };
        if !self.client.code_at(expected.primary).await?.is_empty() {
            return Err(DeployError::AlreadyDeployed { address: expected.primary });
        }

        let receipt = self.client.send(call, self.policy).await?;
        if !receipt.success {
            if !self.client.code_at(expected.primary).await?.is_empty() {
                return Err(DeployError::AlreadyDeployed { address: expected.primary });
            }
            return Err(DeployError::Reverted { tx_hash: receipt.tx_hash });
        }

        let pair = deployed_pair(self.factory, &receipt)?;
        for (predicted, actual) in
            [(expected.primary, pair.primary), (expected.controller, pair.controller)]
        {
            if predicted != actual {
                warn!(%predicted, %actual, "Linked deployment deviated from the expected pair");
                return Err(DeployError::PredictionMismatch { predicted, actual });
            }
        }
        self.check_pair(pair).await?;

        info!(
            primary = %pair.primary,
            controller = %pair.controller,
            tx_hash = %receipt.tx_hash,
            block = receipt.block_number,
            "Linked contracts deployed"
        );
        Ok(LinkedDeployment {
            primary: pair.primary,
            controller: pair.controller,
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
        })
    }

    /// The pair `call` returns when executed against the latest state.
    async fn simulate(&self, call: &ContractCall) -> Result<LinkedAddresses> {
        let output = self.client.call(call.clone()).await.map_err(|err| {
            if err.is_rejection() {
                DeployError::SimulationReverted { target: call.to, reason: err.to_string() }
            } else {
                DeployError::Submission(err)
            }
        })?;
        let returns = ILinkedDeployer::deployCall::abi_decode_returns(&output, true)?;
        Ok(LinkedAddresses {
            primary: returns.primaryContract,
            controller: returns.secondaryContract,
        })
    }

    /// Checks that `pair` is distinct, non-zero and, if enabled, bound through `owner()`.
    async fn check_pair(&self, pair: LinkedAddresses) -> Result<()> {
        let LinkedAddresses { primary, controller } = pair;
        if primary.is_zero() || controller.is_zero() || primary == controller {
            return Err(DeployError::InvalidLinkedPair { primary, controller });
        }
        if !self.check_ownership {
            return Ok(());
        }

        let output = self
            .client
            .call(ContractCall::new(primary, IOwnable::ownerCall {}.abi_encode()))
            .await?;
        let owner = IOwnable::ownerCall::abi_decode_returns(&output, true)?._0;
        if owner != controller {
            warn!(%primary, %controller, %owner, "Primary is not owned by its controller");
            return Err(DeployError::LinkMismatch { primary, expected: controller, actual: owner });
        }
        Ok(())
    }
}
