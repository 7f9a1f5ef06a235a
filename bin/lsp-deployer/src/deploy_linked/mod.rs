//! Linked primary/controller deployments through the LSP23 Linked Contracts Factory.

mod cmd;

pub use cmd::*;

pub use crate::common::{CliError as DeployLinkedError, Result};
