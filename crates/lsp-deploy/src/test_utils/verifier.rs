use std::sync::Mutex;

use crate::{VerificationError, VerificationOutcome, Verifier, VerifyRequest};

/// A [`Verifier`] that records every request and answers with a fixed result.
#[derive(Debug, Default)]
pub struct MockVerifier {
    failure: Option<String>,
    requests: Mutex<Vec<VerifyRequest>>,
}

impl MockVerifier {
    /// Reports every contract as verified.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Rejects every request with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: Some(reason.into()), ..Default::default() }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<VerifyRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Verifier for MockVerifier {
    async fn verify(
        &self,
        request: &VerifyRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.failure {
            Some(reason) => Err(VerificationError::Rejected(reason.clone())),
            None => Ok(VerificationOutcome::Verified),
        }
    }
}
