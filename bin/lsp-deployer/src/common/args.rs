//! Argument groups shared by several commands.

use std::path::PathBuf;

use alloy_primitives::{Address, Bytes, B256};
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use lsp_deploy::{
    encode_constructor_args, load_creation_code, resolve_network, DeploymentMode, InitPayload,
    NetworkConfig, NetworksFile, Salt,
};

use super::{CliError, Result};

/// Network selection
#[derive(Parser, Debug, Clone)]
pub struct NetworkArgs {
    /// Network name: `lukso`, `lukso_testnet`, `localhost` or one defined in --config
    #[arg(long = "network", short = 'n', default_value = "lukso_testnet")]
    pub network: String,

    /// JSON file with additional or overridden networks
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Use this RPC URL instead of the network's
    #[arg(long = "rpc")]
    pub rpc: Option<String>,
}

impl NetworkArgs {
    /// Resolve the selected network.
    pub fn resolve(&self) -> Result<NetworkConfig> {
        let file = self.config.as_deref().map(NetworksFile::load).transpose()?;
        let mut network = resolve_network(&self.network, file.as_ref())?;
        if let Some(rpc) = &self.rpc {
            network.rpc_url.clone_from(rpc);
        }
        Ok(network)
    }
}

/// Signing credential
#[derive(Parser, derive_more::Debug, Clone)]
pub struct KeyArgs {
    /// Hex private key of the deploying account
    #[arg(long = "private-key", env = "DEPLOYER_PRIVATE_KEY", hide_env_values = true)]
    #[debug(skip)]
    pub private_key: String,
}

impl KeyArgs {
    /// Parse the private key.
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        Ok(self.private_key.trim().parse()?)
    }
}

/// Init payload of a single contract
#[derive(Parser, Debug, Clone, Default)]
pub struct PayloadArgs {
    /// Creation bytecode as a hex string
    #[arg(long = "bytecode", conflicts_with_all = ["artifact", "proxy_of"])]
    pub bytecode: Option<Bytes>,

    /// Hardhat or Foundry artifact, or a file with the hex creation bytecode
    #[arg(long = "artifact", conflicts_with = "proxy_of")]
    pub artifact: Option<PathBuf>,

    /// Deploy an ERC-1167 minimal proxy delegating to this implementation
    #[arg(long = "proxy-of", conflicts_with_all = ["constructor", "args"])]
    pub proxy_of: Option<Address>,

    /// Constructor parameter types, e.g. `address,uint256`
    #[arg(long = "constructor", default_value = "")]
    pub constructor: String,

    /// Constructor argument, repeated once per parameter
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl PayloadArgs {
    /// Build the init payload.
    pub fn payload(&self) -> Result<InitPayload> {
        if let Some(implementation) = self.proxy_of {
            return Ok(InitPayload::minimal_proxy(implementation));
        }
        let code = self.creation_code()?;
        let args = encode_constructor_args(&self.constructor, &self.args)?;
        Ok(InitPayload::new(&code, &args)?)
    }

    fn creation_code(&self) -> Result<Bytes> {
        match (&self.bytecode, &self.artifact) {
            (Some(code), _) => Ok(code.clone()),
            (None, Some(path)) => Ok(load_creation_code(path)?),
            (None, None) => Err(CliError::InvalidInput(
                "one of --bytecode, --artifact or --proxy-of is required".to_string(),
            )),
        }
    }
}

/// Salt and universal factory mode
#[derive(Parser, Debug, Clone, Default)]
pub struct DeploymentArgs {
    /// 32-byte salt, zero when omitted
    #[arg(long = "salt")]
    pub salt: Option<B256>,

    /// Deploy with `deployCreate2AndInitialize`, forwarding this calldata
    #[arg(long = "initialize")]
    pub initialize: Option<Bytes>,
}

impl DeploymentArgs {
    /// The selected salt.
    pub fn salt(&self) -> Salt {
        self.salt.unwrap_or_default()
    }

    /// The selected factory mode.
    pub fn mode(&self) -> DeploymentMode {
        match &self.initialize {
            Some(calldata) => DeploymentMode::Create2AndInitialize { calldata: calldata.clone() },
            None => DeploymentMode::Create2,
        }
    }
}
