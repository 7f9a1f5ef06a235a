//! Test utilities: an in-memory chain with emulated factories, a recording verifier and a few
//! payload fixtures.

mod chain;
mod verifier;

pub use chain::*;
pub use verifier::*;

use alloy_primitives::{address, bytes, Address, Bytes};

use crate::{encode_constructor_args, InitPayload, LinkedDeploymentPlan};

/// Address the in-memory chain uses as the transaction sender.
pub const TEST_SENDER: Address = address!("0x42f61368744ca0079e9c6bdfb520c92031eecfdc");

/// Creation code of a small contract, standing in for a compiled artifact.
pub fn sample_creation_code() -> Bytes {
    bytes!(
        "6080604052348015600f57600080fd5b50603f80601d6000396000f3fe"
        "6080604052600080fdfea164736f6c6343000811000a"
    )
}

/// [`sample_creation_code`] with `owner` as its only constructor argument.
pub fn owned_payload(owner: Address) -> InitPayload {
    let args = encode_constructor_args("address", &[owner.to_string()])
        .expect("an address always encodes");
    InitPayload::new(&sample_creation_code(), &args).expect("creation code is not empty")
}

/// A primary/controller plan where the controller takes the primary's address as constructor
/// argument, like a Universal Profile and its Key Manager.
pub fn profile_plan() -> LinkedDeploymentPlan {
    LinkedDeploymentPlan {
        primary_bytecode: bytes!("608060405260aa"),
        controller_bytecode: bytes!("608060405260bb"),
        add_primary_address: true,
        ..Default::default()
    }
}
