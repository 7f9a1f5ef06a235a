use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use alloy_primitives::{keccak256, Address, Bytes, Log, TxHash};
use alloy_sol_types::{SolCall, SolEvent};

use super::TEST_SENDER;
use crate::{
    compute_linked_addresses, create2_address, generate_salt, ChainClient, ChainReceipt,
    ClientError, ConfirmationPolicy, ContractCall, DeploymentMode, ILSP16UniversalFactory,
    ILSP23LinkedContractsFactory, ILinkedDeployer, IOwnable, LinkedAddresses,
    LinkedDeploymentPlan, Salt,
};

/// How an emulated universal factory derives addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FactoryBehavior {
    /// Same derivation as the real factory.
    #[default]
    Canonical,
    /// Uses the caller's salt directly instead of the generated one.
    IgnoresGeneratedSalt,
    /// Another transaction claims the predicted address first, so the deployment reverts.
    LosesRace,
    /// Every deployment reverts.
    Reverts,
    /// Deploys without emitting `ContractCreated`.
    OmitsEvent,
}

/// How an emulated linked contracts factory reports the pair it created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkedFactoryBehavior {
    /// Reports the pair it created.
    #[default]
    Canonical,
    /// Reports the controller as primary and the other way around.
    SwapsPair,
    /// Reports the primary in both positions.
    DuplicatesPrimary,
    /// Deploys without emitting `DeployedContracts`.
    OmitsEvent,
}

/// How an emulated linked deployer wires the pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrchestratorBehavior {
    /// The controller ends up owning the primary.
    #[default]
    Canonical,
    /// The primary stays owned by the deployer contract.
    SkipOwnershipTransfer,
    /// `deploy(salt)` on an existing pair returns it without calling the factory.
    ReturnsExistingPair,
}

#[derive(Debug, Clone)]
enum Emulated {
    UniversalFactory(FactoryBehavior),
    LinkedFactory(LinkedFactoryBehavior),
    Orchestrator { factory: Address, plan: LinkedDeploymentPlan, behavior: OrchestratorBehavior },
}

#[derive(Debug, Clone)]
struct ChainState {
    chain_id: u64,
    block_number: u64,
    code: HashMap<Address, Bytes>,
    owners: HashMap<Address, Address>,
    emulated: HashMap<Address, Emulated>,
    sent: Vec<ContractCall>,
    fail_next_send: bool,
}

/// Execution result of one emulated transaction.
struct Execution {
    success: bool,
    output: Bytes,
    logs: Vec<Log>,
}

impl Execution {
    const fn reverted() -> Self {
        Self { success: false, output: Bytes::new(), logs: Vec::new() }
    }
}

/// A [`ChainClient`] keeping all state in memory.
///
/// Only the contracts installed through the `install_*` methods execute anything; every other
/// transaction reverts. Each transaction is mined in its own block.
#[derive(Debug)]
pub struct InMemoryChain {
    state: Mutex<ChainState>,
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new(31337)
    }
}

impl InMemoryChain {
    /// An empty chain serving `chain_id`.
    pub fn new(chain_id: u64) -> Self {
        Self {
            state: Mutex::new(ChainState {
                chain_id,
                block_number: 0,
                code: HashMap::new(),
                owners: HashMap::new(),
                emulated: HashMap::new(),
                sent: Vec::new(),
                fail_next_send: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }

    /// Sets the runtime code at `address`.
    pub fn set_code(&self, address: Address, code: Bytes) {
        self.state().code.insert(address, code);
    }

    /// Installs a canonical universal factory at `address`.
    pub fn install_universal_factory(&self, address: Address) {
        self.install_universal_factory_with(address, FactoryBehavior::Canonical);
    }

    /// Installs a universal factory with the given behavior at `address`.
    pub fn install_universal_factory_with(&self, address: Address, behavior: FactoryBehavior) {
        let mut state = self.state();
        state.code.insert(address, Bytes::from_static(b"lsp16"));
        state.emulated.insert(address, Emulated::UniversalFactory(behavior));
    }

    /// Installs a canonical linked contracts factory at `address`.
    pub fn install_linked_factory(&self, address: Address) {
        self.install_linked_factory_with(address, LinkedFactoryBehavior::Canonical);
    }

    /// Installs a linked contracts factory with the given behavior at `address`.
    pub fn install_linked_factory_with(&self, address: Address, behavior: LinkedFactoryBehavior) {
        let mut state = self.state();
        state.code.insert(address, Bytes::from_static(b"lsp23"));
        state.emulated.insert(address, Emulated::LinkedFactory(behavior));
    }

    /// Installs a deployer contract at `address` whose `deploy(salt)` forwards `plan` to the
    /// linked factory at `factory`.
    pub fn install_orchestrator(
        &self,
        address: Address,
        factory: Address,
        plan: LinkedDeploymentPlan,
    ) {
        self.install_orchestrator_with(address, factory, plan, OrchestratorBehavior::Canonical);
    }

    /// Like [`Self::install_orchestrator`] with a specific behavior.
    pub fn install_orchestrator_with(
        &self,
        address: Address,
        factory: Address,
        plan: LinkedDeploymentPlan,
        behavior: OrchestratorBehavior,
    ) {
        let mut state = self.state();
        state.code.insert(address, Bytes::from_static(b"orchestrator"));
        state.emulated.insert(address, Emulated::Orchestrator { factory, plan, behavior });
    }

    /// Makes the next [`ChainClient::send`] fail with a transport-like error before anything is
    /// executed.
    pub fn fail_next_send(&self) {
        self.state().fail_next_send = true;
    }

    /// Every transaction sent so far, including reverted ones.
    pub fn sent_transactions(&self) -> Vec<ContractCall> {
        self.state().sent.clone()
    }

    /// Current block height.
    pub fn block_number(&self) -> u64 {
        self.state().block_number
    }

    /// The owner recorded for `contract`, if any.
    pub fn owner_of(&self, contract: Address) -> Option<Address> {
        self.state().owners.get(&contract).copied()
    }
}

/// Rebuilds the plan from the factory's calldata.
fn plan_from_call(
    call: &ILSP23LinkedContractsFactory::deployContractsCall,
) -> LinkedDeploymentPlan {
    let primary = &call.primaryContractDeployment;
    let secondary = &call.secondaryContractDeployment;
    LinkedDeploymentPlan {
        primary_bytecode: primary.creationBytecode.clone(),
        primary_funding: primary.fundingAmount,
        controller_bytecode: secondary.creationBytecode.clone(),
        controller_funding: secondary.fundingAmount,
        add_primary_address: secondary.addPrimaryContractAddress,
        extra_constructor_params: secondary.extraConstructorParams.clone(),
        post_deployment_module: call.postDeploymentModule,
        post_deployment_calldata: call.postDeploymentModuleCalldata.clone(),
    }
}

fn created_output(created: Address) -> Bytes {
    ILSP16UniversalFactory::deployCreate2Call::abi_encode_returns(&(created,)).into()
}

fn selector(input: &[u8]) -> Option<[u8; 4]> {
    input.get(..4)?.try_into().ok()
}

impl ChainState {
    fn has_code(&self, address: Address) -> bool {
        self.code.get(&address).is_some_and(|code| !code.is_empty())
    }

    fn execute(&mut self, call: &ContractCall) -> Execution {
        let Some(emulated) = self.emulated.get(&call.to).cloned() else {
            return Execution::reverted();
        };
        match emulated {
            Emulated::UniversalFactory(behavior) => self.universal_deploy(call, behavior),
            Emulated::LinkedFactory(reporting) => {
                use ILSP23LinkedContractsFactory::deployContractsCall;
                let Ok(decoded) = deployContractsCall::abi_decode(&call.input, true) else {
                    return Execution::reverted();
                };
                let plan = plan_from_call(&decoded);
                if call.value != plan.total_funding() {
                    return Execution::reverted();
                }
                let salt = decoded.primaryContractDeployment.salt;
                let behavior = OrchestratorBehavior::Canonical;
                self.linked_deploy(call.to, reporting, &plan, salt, behavior, None)
            }
            Emulated::Orchestrator { factory, plan, behavior } => {
                let Ok(decoded) = ILinkedDeployer::deployCall::abi_decode(&call.input, true) else {
                    return Execution::reverted();
                };
                let Some(Emulated::LinkedFactory(reporting)) = self.emulated.get(&factory).cloned()
                else {
                    return Execution::reverted();
                };
                if behavior == OrchestratorBehavior::ReturnsExistingPair {
                    let pair = compute_linked_addresses(factory, &plan, decoded.salt);
                    if self.has_code(pair.primary) {
                        let output = ILinkedDeployer::deployCall::abi_encode_returns(&(
                            pair.primary,
                            pair.controller,
                        ))
                        .into();
                        return Execution { success: true, output, logs: Vec::new() };
                    }
                }
                self.linked_deploy(factory, reporting, &plan, decoded.salt, behavior, Some(call.to))
            }
        }
    }

    fn universal_deploy(&mut self, call: &ContractCall, behavior: FactoryBehavior) -> Execution {
        let factory = call.to;
        let input = &call.input;
        let plain = selector(input) == Some(ILSP16UniversalFactory::deployCreate2Call::SELECTOR);
        let decoded = if plain {
            ILSP16UniversalFactory::deployCreate2Call::abi_decode(input, true)
                .map(|call| (call.creationBytecode, call.providedSalt, DeploymentMode::Create2))
        } else {
            ILSP16UniversalFactory::deployCreate2AndInitializeCall::abi_decode(input, true).map(
                |call| {
                    let mode =
                        DeploymentMode::Create2AndInitialize { calldata: call.initializeCalldata };
                    (call.creationBytecode, call.providedSalt, mode)
                },
            )
        };
        let Ok((bytecode, provided_salt, mode)) = decoded else {
            return Execution::reverted();
        };
        if bytecode.is_empty() {
            return Execution::reverted();
        }

        let generated_salt = generate_salt(provided_salt, &mode);
        let create2_salt = match behavior {
            FactoryBehavior::IgnoresGeneratedSalt => provided_salt,
            _ => generated_salt,
        };
        let created = create2_address(factory, create2_salt, keccak256(&bytecode));
        match behavior {
            FactoryBehavior::LosesRace => {
                self.code.insert(created, bytecode);
                return Execution::reverted();
            }
            FactoryBehavior::Reverts => return Execution::reverted(),
            _ => {}
        }
        if self.has_code(created) {
            return Execution::reverted();
        }
        self.code.insert(created, bytecode);
        if behavior == FactoryBehavior::OmitsEvent {
            return Execution { success: true, output: created_output(created), logs: Vec::new() };
        }

        let event = ILSP16UniversalFactory::ContractCreated {
            createdContract: created,
            providedSalt: provided_salt,
            generatedSalt: generated_salt,
            initialized: mode.is_initializable(),
            initializeCalldata: mode.initialize_calldata(),
        };
        let log = Log { address: factory, data: event.encode_log_data() };
        Execution { success: true, output: created_output(created), logs: vec![log] }
    }

    fn linked_deploy(
        &mut self,
        factory: Address,
        reporting: LinkedFactoryBehavior,
        plan: &LinkedDeploymentPlan,
        salt: Salt,
        behavior: OrchestratorBehavior,
        orchestrator: Option<Address>,
    ) -> Execution {
        let LinkedAddresses { primary, controller } = compute_linked_addresses(factory, plan, salt);
        if plan.primary_bytecode.is_empty()
            || plan.controller_bytecode.is_empty()
            || self.has_code(primary)
            || self.has_code(controller)
        {
            return Execution::reverted();
        }

        self.code.insert(primary, plan.primary_bytecode.clone());
        self.code.insert(controller, plan.controller_init_code(primary));
        let owner = match behavior {
            OrchestratorBehavior::SkipOwnershipTransfer => orchestrator.unwrap_or(TEST_SENDER),
            _ => controller,
        };
        self.owners.insert(primary, owner);

        let (primary, controller) = match reporting {
            LinkedFactoryBehavior::SwapsPair => (controller, primary),
            LinkedFactoryBehavior::DuplicatesPrimary => (primary, primary),
            _ => (primary, controller),
        };
        let output = ILinkedDeployer::deployCall::abi_encode_returns(&(primary, controller)).into();
        if reporting == LinkedFactoryBehavior::OmitsEvent {
            return Execution { success: true, output, logs: Vec::new() };
        }
        let event = ILSP23LinkedContractsFactory::DeployedContracts {
            primaryContract: primary,
            secondaryContract: controller,
            primaryContractDeployment: crate::primary_deployment(plan, salt),
            secondaryContractDeployment: crate::secondary_deployment(plan),
            postDeploymentModule: plan.post_deployment_module,
            postDeploymentModuleCalldata: plan.post_deployment_calldata.clone(),
        };
        let log = Log { address: factory, data: event.encode_log_data() };
        Execution { success: true, output, logs: vec![log] }
    }

    fn view(&self, call: &ContractCall) -> Result<Bytes, ClientError> {
        let revert = || ClientError::Rpc("execution reverted".to_string());
        let input = &call.input;
        let selector = selector(input);

        if selector == Some(IOwnable::ownerCall::SELECTOR) {
            let owner = self.owners.get(&call.to).copied().ok_or_else(revert)?;
            return Ok(IOwnable::ownerCall::abi_encode_returns(&(owner,)).into());
        }

        match self.emulated.get(&call.to) {
            Some(Emulated::UniversalFactory(_))
                if selector == Some(ILSP16UniversalFactory::computeAddressCall::SELECTOR) =>
            {
                let decoded = ILSP16UniversalFactory::computeAddressCall::abi_decode(input, true)
                    .map_err(|_| revert())?;
                let mode = if decoded.initializable {
                    DeploymentMode::Create2AndInitialize { calldata: decoded.initializeCalldata }
                } else {
                    DeploymentMode::Create2
                };
                let address = create2_address(
                    call.to,
                    generate_salt(decoded.providedSalt, &mode),
                    decoded.creationBytecodeHash,
                );
                Ok(ILSP16UniversalFactory::computeAddressCall::abi_encode_returns(&(address,))
                    .into())
            }
            Some(Emulated::LinkedFactory(_))
                if selector == Some(ILSP23LinkedContractsFactory::computeAddressesCall::SELECTOR) =>
            {
                let decoded =
                    ILSP23LinkedContractsFactory::computeAddressesCall::abi_decode(input, true)
                        .map_err(|_| revert())?;
                let deploy = ILSP23LinkedContractsFactory::deployContractsCall {
                    primaryContractDeployment: decoded.primaryContractDeployment,
                    secondaryContractDeployment: decoded.secondaryContractDeployment,
                    postDeploymentModule: decoded.postDeploymentModule,
                    postDeploymentModuleCalldata: decoded.postDeploymentModuleCalldata,
                };
                let salt = deploy.primaryContractDeployment.salt;
                let pair = compute_linked_addresses(call.to, &plan_from_call(&deploy), salt);
                let output = ILSP23LinkedContractsFactory::computeAddressesCall::abi_encode_returns(
                    &(pair.primary, pair.controller),
                );
                Ok(output.into())
            }
            Some(Emulated::Orchestrator { .. })
                if selector == Some(ILinkedDeployer::deployCall::SELECTOR) =>
            {
                // Executes on a scratch copy; a simulation never changes state.
                let execution = self.clone().execute(call);
                if execution.success {
                    Ok(execution.output)
                } else {
                    Err(revert())
                }
            }
            _ => Err(revert()),
        }
    }
}

impl ChainClient for InMemoryChain {
    async fn chain_id(&self) -> Result<u64, ClientError> {
        Ok(self.state().chain_id)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ClientError> {
        Ok(self.state().code.get(&address).cloned().unwrap_or_default())
    }

    async fn call(&self, call: ContractCall) -> Result<Bytes, ClientError> {
        self.state().view(&call)
    }

    async fn send(
        &self,
        call: ContractCall,
        _policy: ConfirmationPolicy,
    ) -> Result<ChainReceipt, ClientError> {
        let mut state = self.state();
        if std::mem::take(&mut state.fail_next_send) {
            return Err(ClientError::Rpc("connection reset by peer".to_string()));
        }

        state.block_number += 1;
        let block_number = state.block_number;
        let tx_hash: TxHash = keccak256([&block_number.to_be_bytes()[..], &call.input].concat());
        let Execution { success, logs, .. } = state.execute(&call);
        state.sent.push(call);

        Ok(ChainReceipt { tx_hash, block_number, success, logs })
    }
}
