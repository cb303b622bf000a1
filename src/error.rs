//! Error handling

use thiserror::Error;

use crate::status_codes::StatusCodesError;

/// Everything a harness operation can fail with.
///
/// Each variant reaches the cucumber runner unchanged and is reported as
/// the failure of the step that produced it.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The request target could not be turned into an absolute http(s) URL.
    #[error("malformed request target {input:?}: {reason}")]
    MalformedInput {
        /// What the step was given
        input: String,
        /// Why it was rejected
        reason: String,
    },
    /// The request never produced a response, or its body could not be read.
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// The resolved request URL
        url: String,
        /// What went wrong on the wire
        reason: String,
    },
    /// The stored response did not match.
    #[error("expected {subject} {expected:?}, got {actual:?}")]
    AssertionMismatch {
        /// What was compared, eg `response code`
        subject: &'static str,
        /// The value the scenario asked for
        expected: String,
        /// The value the response carried
        actual: String,
    },
    /// An assertion ran before any request produced a response.
    #[error("cannot check {assertion}: no response has been received")]
    NoResponseAvailable {
        /// The assertion that was attempted
        assertion: &'static str,
    },
    /// The blocking task running a step died before finishing.
    #[error("step did not complete: {0}")]
    Interrupted(String),
    /// The bundled status code table is unusable.
    #[error(transparent)]
    StatusTable(#[from] StatusCodesError),
}

impl HarnessError {
    pub(crate) fn malformed(input: &str, reason: impl ToString) -> Self {
        HarnessError::MalformedInput {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn transport(url: &str, reason: impl ToString) -> Self {
        HarnessError::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
