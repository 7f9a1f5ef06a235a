//! `lsp-deployer` CLI tool for deterministic contract deployments
//!
//! Predicts CREATE2 addresses offline, deploys through the LSP16 Universal Factory or the LSP23
//! Linked Contracts Factory, and triggers source verification.

use clap::Parser;
use lsp_deployer::{Error, MainCmd};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    MainCmd::parse().run().await.inspect_err(|e| eprintln!("{e}"))
}
