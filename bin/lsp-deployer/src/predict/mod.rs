//! Offline prediction of universal factory deployment addresses.

mod cmd;

pub use cmd::*;

pub use crate::common::{CliError as PredictError, Result};
