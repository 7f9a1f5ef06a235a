//! Deterministic contract deployments for LUKSO-style factories.
//!
//! Addresses are predicted offline from the init payload and a caller-chosen salt, the
//! deployment is submitted through the LSP16 Universal Factory (single contract) or the LSP23
//! Linked Contracts Factory (primary + controller pair), the chain's answer is checked against
//! the prediction, and source verification is triggered on a best-effort basis.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod client;
pub use client::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod interfaces;
pub use interfaces::*;

mod ledger;
pub use ledger::*;

mod linked;
pub use linked::*;

mod payload;
pub use payload::*;

mod pipeline;
pub use pipeline::*;

mod predict;
pub use predict::*;

mod submit;
pub use submit::*;

mod types;
pub use types::*;

mod verify;
pub use verify::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
