//! Single-contract deployment through the universal factory.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolEvent};
use tracing::{debug, info, warn};

use crate::{
    predict, ChainClient, ChainReceipt, ConfirmationPolicy, ContractCall, DeployError,
    DeploymentMode, DeploymentReceipt, ILSP16UniversalFactory, InitPayload, Result, Salt,
};

/// Fails with [`DeployError::FactoryUnavailable`] unless `address` holds code.
pub(crate) async fn ensure_deployed<C: ChainClient>(client: &C, address: Address) -> Result<()> {
    if client.code_at(address).await?.is_empty() {
        return Err(DeployError::FactoryUnavailable { address });
    }
    Ok(())
}

/// Calldata for the universal factory's deploy entry point matching `mode`.
pub fn encode_deploy_call(payload: &InitPayload, salt: Salt, mode: &DeploymentMode) -> Bytes {
    let creation_bytecode = payload.bytes().clone();
    match mode {
        DeploymentMode::Create2 => ILSP16UniversalFactory::deployCreate2Call {
            creationBytecode: creation_bytecode,
            providedSalt: salt,
        }
        .abi_encode(),
        DeploymentMode::Create2AndInitialize { calldata } => {
            ILSP16UniversalFactory::deployCreate2AndInitializeCall {
                creationBytecode: creation_bytecode,
                providedSalt: salt,
                initializeCalldata: calldata.clone(),
                constructorMsgValue: U256::ZERO,
                initializeCalldataMsgValue: U256::ZERO,
            }
            .abi_encode()
        }
    }
    .into()
}

/// The address announced by the factory's `ContractCreated` event in `receipt`.
pub fn created_address(factory: Address, receipt: &ChainReceipt) -> Result<Address> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == factory)
        .find_map(|log| {
            ILSP16UniversalFactory::ContractCreated::decode_log_data(&log.data, true).ok()
        })
        .map(|event| event.createdContract)
        .ok_or(DeployError::MissingEvent { tx_hash: receipt.tx_hash, factory })
}

/// Sends deployments through the universal factory and checks the outcome against the offline
/// prediction.
#[derive(Debug)]
pub struct Submitter<'a, C> {
    client: &'a C,
    policy: ConfirmationPolicy,
}

impl<'a, C: ChainClient> Submitter<'a, C> {
    /// Creates a submitter waiting according to `policy`.
    pub const fn new(client: &'a C, policy: ConfirmationPolicy) -> Self {
        Self { client, policy }
    }

    /// Asks the factory itself where it would deploy `payload`, via `computeAddress`.
    pub async fn factory_prediction(
        &self,
        factory: Address,
        payload: &InitPayload,
        salt: Salt,
        mode: &DeploymentMode,
    ) -> Result<Address> {
        let input = ILSP16UniversalFactory::computeAddressCall {
            creationBytecodeHash: payload.hash(),
            providedSalt: salt,
            initializable: mode.is_initializable(),
            initializeCalldata: mode.initialize_calldata(),
        }
        .abi_encode();
        let output = self.client.call(ContractCall::new(factory, input)).await?;
        Ok(ILSP16UniversalFactory::computeAddressCall::abi_decode_returns(&output, true)?._0)
    }

    /// Deploys `payload` through `factory` and returns the confirmed receipt.
    ///
    /// The address is predicted offline first. Nothing is sent when the factory is missing or the
    /// predicted address is already occupied. After confirmation the address from the factory's
    /// event must equal the prediction.
    pub async fn submit(
        &self,
        factory: Address,
        payload: &InitPayload,
        salt: Salt,
        mode: &DeploymentMode,
    ) -> Result<DeploymentReceipt> {
        let predicted = predict(factory, payload, salt, mode);
        debug!(%factory, %salt, %predicted, payload_hash = %payload.hash(), "Predicted address");

        ensure_deployed(self.client, factory).await?;
        if !self.client.code_at(predicted).await?.is_empty() {
            return Err(DeployError::AlreadyDeployed { address: predicted });
        }

        let call = ContractCall::new(factory, encode_deploy_call(payload, salt, mode));
        let receipt = self.client.send(call, self.policy).await?;

        if !receipt.success {
            // Someone else may have landed the same triple between the check and our transaction.
            if !self.client.code_at(predicted).await?.is_empty() {
                return Err(DeployError::AlreadyDeployed { address: predicted });
            }
            return Err(DeployError::Reverted { tx_hash: receipt.tx_hash });
        }

        let actual = created_address(factory, &receipt)?;
        if actual != predicted {
            warn!(
                %predicted,
                %actual,
                tx_hash = %receipt.tx_hash,
                "Factory created an unexpected address"
            );
            return Err(DeployError::PredictionMismatch { predicted, actual });
        }

        info!(
            address = %actual,
            tx_hash = %receipt.tx_hash,
            block = receipt.block_number,
            confirmations = self.policy.confirmations(),
            "Contract deployed"
        );
        Ok(DeploymentReceipt {
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            confirmations: self.policy.confirmations(),
            address: actual,
        })
    }
}
