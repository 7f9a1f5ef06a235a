//! Well-known addresses and bytecode fragments.

use std::time::Duration;

use alloy_primitives::{address, hex, Address};

/// Address of the LSP16 Universal Factory. Deployed with Nick's method, so it is identical on
/// every network that has it.
pub const UNIVERSAL_FACTORY_ADDRESS: Address =
    address!("0x160000700d62b8ddc65faed5ac5add2d2e30a803");

/// Address of the LSP23 Linked Contracts Factory, network-independent for the same reason.
pub const LINKED_CONTRACTS_FACTORY_ADDRESS: Address =
    address!("0x2300000a84d25df63081feaa37ba6b62c4c89a30");

/// ERC-1167 minimal proxy bytes preceding the implementation address.
pub const MINIMAL_PROXY_PREFIX: [u8; 20] = hex!("3d602d80600a3d3981f3363d3d373d3d3d363d73");

/// ERC-1167 minimal proxy bytes following the implementation address.
pub const MINIMAL_PROXY_SUFFIX: [u8; 15] = hex!("5af43d82803e903d91602b57fd5bf3");

/// Length of a complete minimal proxy creation code.
pub const MINIMAL_PROXY_LEN: usize = MINIMAL_PROXY_PREFIX.len() + 20 + MINIMAL_PROXY_SUFFIX.len();

/// A deployment is never reported before this many blocks include it.
pub const MIN_CONFIRMATIONS: u64 = 1;

/// Confirmation wait used when the network config does not set one.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
