//! Command implementations of the `lsp-deployer` CLI.

mod cmd;
pub use cmd::*;

/// Argument groups, logging and errors shared by all commands
pub mod common;

/// Single-contract deployment through the universal factory
pub mod deploy;

/// Primary/controller deployment through the linked contracts factory
pub mod deploy_linked;

/// Offline address prediction
pub mod predict;

/// Stand-alone source verification
pub mod verify;
