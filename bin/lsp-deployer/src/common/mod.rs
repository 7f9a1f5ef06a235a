mod args;
mod error;
mod logging;
mod verifier;

pub use args::*;
pub use error::*;
pub use logging::*;
pub use verifier::*;
