use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::{
    fillers::{CachedNonceManager, ChainIdFiller, NonceFiller},
    Provider, ProviderBuilder,
};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use tracing::{debug, info};

use super::{
    ensure_chain_id, ChainClient, ChainReceipt, ClientError, ConfirmationPolicy, ContractCall,
};
use crate::{DeployError, NetworkConfig};

/// [`ChainClient`] backed by an alloy provider.
#[derive(Debug, Clone)]
pub struct RpcClient<P> {
    provider: P,
}

impl<P> RpcClient<P> {
    /// Wraps an already configured provider. The provider is expected to fill nonces, gas and
    /// signatures.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

/// Connects to `network` with `signer` and checks that the endpoint serves the configured chain.
///
/// Nonces are tracked locally per signer so that concurrent deployments from the same credential
/// are assigned strictly increasing nonces.
pub async fn connect(
    network: &NetworkConfig,
    signer: PrivateKeySigner,
) -> Result<RpcClient<impl Provider + Clone>, DeployError> {
    let url = network.rpc_url.parse::<reqwest::Url>().map_err(|e| {
        ClientError::Rpc(format!("Invalid RPC URL '{}': {}", network.rpc_url, e))
    })?;
    let sender = signer.address();

    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .with_gas_estimation()
        .filler(NonceFiller::new(CachedNonceManager::default()))
        .filler(ChainIdFiller::new(Some(network.chain_id)))
        .wallet(EthereumWallet::from(signer))
        .on_http(url);
    let client = RpcClient::new(provider);

    ensure_chain_id(&client, network.chain_id).await?;

    info!(network = %network.name, chain_id = network.chain_id, %sender, "Connected");
    Ok(client)
}

fn transaction_request(call: ContractCall) -> TransactionRequest {
    TransactionRequest::default().with_to(call.to).with_input(call.input).with_value(call.value)
}

impl<P: Provider> ChainClient for RpcClient<P> {
    async fn chain_id(&self) -> Result<u64, ClientError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ClientError> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn call(&self, call: ContractCall) -> Result<Bytes, ClientError> {
        Ok(self.provider.call(transaction_request(call)).await?)
    }

    async fn send(
        &self,
        call: ContractCall,
        policy: ConfirmationPolicy,
    ) -> Result<ChainReceipt, ClientError> {
        let pending = self
            .provider
            .send_transaction(transaction_request(call))
            .await?
            .with_required_confirmations(policy.confirmations())
            .with_timeout(policy.timeout());
        debug!(
            tx_hash = %pending.tx_hash(),
            confirmations = policy.confirmations(),
            "Transaction sent"
        );

        let receipt = pending.get_receipt().await?;
        Ok(ChainReceipt {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number().unwrap_or_default(),
            success: receipt.status(),
            logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
        })
    }
}
