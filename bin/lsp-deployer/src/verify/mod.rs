//! Re-triggering source verification of a deployed contract.

mod cmd;

pub use cmd::*;

pub use crate::common::{CliError as VerifyCmdError, Result};
