use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{is_already_verified, VerificationError, VerificationOutcome, Verifier, VerifyRequest};
use crate::ExplorerConfig;

/// Default delay between two `checkverifystatus` requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of `checkverifystatus` requests before giving up.
pub const DEFAULT_MAX_POLLS: u32 = 12;

/// Compiler inputs the explorer needs to rebuild the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBundle {
    /// Solidity standard JSON input, as produced by the build.
    pub standard_json_input: String,
    /// Full compiler version, e.g. `v0.8.17+commit.8df45f5f`.
    pub compiler_version: String,
}

/// Verifies through an Etherscan-compatible explorer API (`verifysourcecode` followed by
/// `checkverifystatus` polling).
#[derive(derive_more::Debug, Clone)]
pub struct ExplorerVerifier {
    #[debug(skip)]
    http: reqwest::Client,
    api_url: String,
    #[debug(skip)]
    api_key: Option<String>,
    source: SourceBundle,
    poll_interval: Duration,
    max_polls: u32,
}

/// Envelope of every Etherscan-style API answer.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: String,
}

impl ApiResponse {
    fn is_ok(&self) -> bool {
        self.status == "1"
    }
}

impl ExplorerVerifier {
    /// A verifier for `explorer` submitting `source`.
    pub fn new(explorer: &ExplorerConfig, source: SourceBundle) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: explorer.api_url.clone(),
            api_key: explorer.api_key.clone(),
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    /// Sets the status polling cadence.
    pub const fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    async fn submit(&self, request: &VerifyRequest) -> Result<ApiResponse, VerificationError> {
        let address = request.address.to_string();
        let constructor_args = alloy_primitives::hex::encode(&request.constructor_args);
        let mut form = vec![
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("contractaddress", address.as_str()),
            ("sourceCode", self.source.standard_json_input.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("contractname", request.contract.as_str()),
            ("compilerversion", self.source.compiler_version.as_str()),
            // Misspelled in the Etherscan API.
            ("constructorArguements", constructor_args.as_str()),
        ];
        if let Some(key) = &self.api_key {
            form.push(("apikey", key.as_str()));
        }

        let response = self.http.post(&self.api_url).form(&form).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    async fn check_status(&self, guid: &str) -> Result<ApiResponse, VerificationError> {
        let mut query =
            vec![("module", "contract"), ("action", "checkverifystatus"), ("guid", guid)];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        let response = self.http.get(&self.api_url).query(&query).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }
}

impl Verifier for ExplorerVerifier {
    async fn verify(
        &self,
        request: &VerifyRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        let submitted = self.submit(request).await?;
        if !submitted.is_ok() {
            if is_already_verified(&submitted.result) || is_already_verified(&submitted.message) {
                return Ok(VerificationOutcome::Verified);
            }
            return Err(VerificationError::Rejected(submitted.result));
        }

        let guid = submitted.result;
        debug!(address = %request.address, %guid, "Verification submitted");

        for attempt in 1..=self.max_polls {
            tokio::time::sleep(self.poll_interval).await;
            let status = self.check_status(&guid).await?;
            if is_already_verified(&status.result) || status.result.starts_with("Pass") {
                return Ok(VerificationOutcome::Verified);
            }
            if status.result.to_ascii_lowercase().contains("pending") {
                debug!(%guid, attempt, "Verification pending");
                continue;
            }
            if !status.is_ok() {
                return Err(VerificationError::Rejected(status.result));
            }
        }

        Err(VerificationError::Timeout { attempts: self.max_polls })
    }
}
