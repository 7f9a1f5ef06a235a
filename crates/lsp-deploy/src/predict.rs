//! Offline address prediction.
//!
//! Everything in this module is pure: no I/O, no chain state. The functions mirror the salt
//! derivations of the LSP16 and LSP23 factories so the result can be compared with what the chain
//! reports after the deployment.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;

use crate::{DeploymentMode, InitPayload, LinkedAddresses, Salt};

/// EIP-1014 address: `keccak256(0xff ++ deployer ++ salt ++ init_code_hash)[12..]`.
pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    deployer.create2(salt, init_code_hash)
}

/// The salt the universal factory actually feeds to CREATE2.
///
/// `keccak256(abi.encodePacked(false, salt))` for plain CREATE2,
/// `keccak256(abi.encodePacked(true, initializeCalldata, salt))` for initializable deployments.
pub fn generate_salt(salt: Salt, mode: &DeploymentMode) -> B256 {
    let packed = match mode {
        DeploymentMode::Create2 => (false, salt).abi_encode_packed(),
        DeploymentMode::Create2AndInitialize { calldata } => {
            (true, calldata.clone(), salt).abi_encode_packed()
        }
    };
    keccak256(packed)
}

/// Predicts where the universal factory at `factory` will create `payload`.
///
/// Equivalent to the factory's own `computeAddress(keccak256(payload), salt, initializable,
/// calldata)`.
pub fn predict(
    factory: Address,
    payload: &InitPayload,
    salt: Salt,
    mode: &DeploymentMode,
) -> Address {
    create2_address(factory, generate_salt(salt, mode), payload.hash())
}

/// Predicts the address of an ERC-1167 minimal proxy for `implementation`.
pub fn predict_minimal_proxy(
    factory: Address,
    implementation: Address,
    salt: Salt,
    mode: &DeploymentMode,
) -> Address {
    predict(factory, &InitPayload::minimal_proxy(implementation), salt, mode)
}

/// Everything the linked factory needs besides the salt.
///
/// The controller's creation code optionally receives the primary's address as its first
/// constructor argument, followed by `extra_constructor_params`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedDeploymentPlan {
    /// Creation code of the primary contract.
    pub primary_bytecode: Bytes,
    /// Value forwarded to the primary's constructor.
    pub primary_funding: U256,
    /// Creation code of the controller contract.
    pub controller_bytecode: Bytes,
    /// Value forwarded to the controller's constructor.
    pub controller_funding: U256,
    /// Append `abi.encode(primary)` to the controller's creation code.
    pub add_primary_address: bool,
    /// Appended after the primary address.
    pub extra_constructor_params: Bytes,
    /// Contract called once both are deployed, zero for none.
    pub post_deployment_module: Address,
    /// Calldata passed to the post-deployment module.
    pub post_deployment_calldata: Bytes,
}

impl LinkedDeploymentPlan {
    /// Total value the deployment transaction must carry.
    pub fn total_funding(&self) -> U256 {
        self.primary_funding + self.controller_funding
    }

    /// The controller's final creation code once the primary address is known.
    pub fn controller_init_code(&self, primary: Address) -> Bytes {
        if !self.add_primary_address {
            return self.controller_bytecode.clone();
        }
        let mut code = self.controller_bytecode.to_vec();
        code.extend_from_slice(&primary.abi_encode());
        code.extend_from_slice(&self.extra_constructor_params);
        code.into()
    }
}

/// The salt the linked factory uses for the primary contract.
///
/// `keccak256(abi.encode(salt, controllerBytecode, addPrimaryAddress, extraParams, module,
/// moduleCalldata))`: everything that shapes the controller is committed to, so a different
/// controller can never be paired with an existing primary.
pub fn generate_primary_salt(plan: &LinkedDeploymentPlan, salt: Salt) -> B256 {
    keccak256(
        (
            salt,
            plan.controller_bytecode.clone(),
            plan.add_primary_address,
            plan.extra_constructor_params.clone(),
            plan.post_deployment_module,
            plan.post_deployment_calldata.clone(),
        )
            .abi_encode_params(),
    )
}

/// Predicts both addresses of a linked deployment through the factory at `factory`.
///
/// The primary is created with the generated primary salt; the controller is created with
/// `keccak256(abi.encodePacked(primary))`, which ties it to exactly one primary.
pub fn compute_linked_addresses(
    factory: Address,
    plan: &LinkedDeploymentPlan,
    salt: Salt,
) -> LinkedAddresses {
    let primary = create2_address(
        factory,
        generate_primary_salt(plan, salt),
        keccak256(&plan.primary_bytecode),
    );
    let controller = create2_address(
        factory,
        keccak256(primary.as_slice()),
        keccak256(plan.controller_init_code(primary)),
    );
    LinkedAddresses { primary, controller }
}
