use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::{is_already_verified, VerificationError, VerificationOutcome, Verifier, VerifyRequest};

/// Runs an external tool such as `npx hardhat verify`.
///
/// Every argument of the template may contain `{address}`, `{network}`, `{contract}` or
/// `{constructorArgs}` (hex, `0x`-prefixed). An argument that is exactly `{args}` expands into one
/// argument per textual constructor value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandVerifier {
    program: String,
    args: Vec<String>,
}

impl CommandVerifier {
    /// A verifier running `program` with the argument template `args`.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self { program: program.into(), args: args.into_iter().map(Into::into).collect() }
    }

    /// `npx hardhat verify {address} --network {network} --contract {contract} {args}`.
    pub fn hardhat() -> Self {
        Self::new(
            "npx",
            [
                "hardhat",
                "verify",
                "{address}",
                "--network",
                "{network}",
                "--contract",
                "{contract}",
                "{args}",
            ],
        )
    }

    /// Parses a whitespace-separated command line template.
    pub fn from_template(template: &str) -> Option<Self> {
        let mut parts = template.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    /// The program that will be run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments for `request` with all placeholders substituted.
    pub fn expand_args(&self, request: &VerifyRequest) -> Vec<String> {
        let mut expanded = Vec::with_capacity(self.args.len() + request.constructor_values.len());
        for arg in &self.args {
            if arg == "{args}" {
                expanded.extend(request.constructor_values.iter().cloned());
                continue;
            }
            expanded.push(
                arg.replace("{address}", &request.address.to_checksum(None))
                    .replace("{network}", &request.network)
                    .replace("{contract}", &request.contract)
                    .replace("{constructorArgs}", &request.constructor_args.to_string()),
            );
        }
        expanded
    }
}

impl Verifier for CommandVerifier {
    async fn verify(
        &self,
        request: &VerifyRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        let args = self.expand_args(request);
        debug!(program = %self.program, ?args, "Running verification command");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() || is_already_verified(&stdout) || is_already_verified(&stderr)
        {
            return Ok(VerificationOutcome::Verified);
        }

        let message = if stderr.trim().is_empty() { stdout } else { stderr };
        Err(VerificationError::CommandFailed {
            status: output.status.to_string(),
            output: message.trim().to_string(),
        })
    }
}
