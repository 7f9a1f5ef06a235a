//! Single-contract deployments through the LSP16 Universal Factory.
//!
//! The predicted address and explorer link are printed before anything is sent, and the JSON
//! report once the deployment is confirmed. Every confirmed deployment is recorded in a
//! per-network ledger, which also refuses to reuse a salt for a changed payload.

mod cmd;

pub use cmd::*;

pub use crate::common::{CliError as DeployCmdError, Result};
