//! The HTTP client capability the harness issues requests through.

use std::fmt;
use std::io::Read;
use std::time::Instant;

use tracing::debug;
use ureq::Agent;
use ureq::http::HeaderMap;
use url::Url;

use crate::config::HarnessConfig;
use crate::error::HarnessError;

/// A body that has not been read yet.
pub type BodyReader = Box<dyn Read + Send>;

/// What came back from a GET, before anything has read the body.
pub struct FetchedResponse {
    /// Numeric status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// The unread body.
    pub body: BodyReader,
}

impl fmt::Debug for FetchedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Issues one blocking GET.
///
/// Implementations must not retry, and must report every status code
/// (including 4xx and 5xx) as a response rather than an error. Failures
/// to get any response at all are [`HarnessError::Transport`].
pub trait HttpFetch {
    /// Fetches `url`, giving up once `deadline` passes.
    fn get(&self, url: &Url, deadline: Option<Instant>) -> Result<FetchedResponse, HarnessError>;
}

/// [`HttpFetch`] over a shared [`ureq::Agent`], which pools connections.
#[derive(Clone, Debug)]
pub struct UreqFetcher {
    agent: Agent,
}

impl UreqFetcher {
    /// Builds the agent once; its settings never change afterwards.
    pub fn new(config: &HarnessConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(config.max_redirects)
            .user_agent(config.user_agent.as_str())
            .build()
            .into();
        Self { agent }
    }
}

impl HttpFetch for UreqFetcher {
    fn get(&self, url: &Url, deadline: Option<Instant>) -> Result<FetchedResponse, HarnessError> {
        let mut request = self.agent.get(url.as_str());
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(HarnessError::transport(
                    url.as_str(),
                    "deadline passed before the request was sent",
                ));
            }
            request = request.config().timeout_global(Some(remaining)).build();
        }

        let response = request
            .call()
            .map_err(|err| HarnessError::transport(url.as_str(), err))?;
        let (parts, body) = response.into_parts();
        debug!("GET {} answered {}", url, parts.status);

        Ok(FetchedResponse {
            status: parts.status.as_u16(),
            headers: parts.headers,
            body: Box::new(body.into_reader()),
        })
    }
}

/// Reads the whole body, failing if it holds more than `limit` bytes.
pub(crate) fn read_limited(reader: &mut dyn Read, limit: u64) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(std::io::Error::other(format!(
            "response body is larger than {limit} bytes"
        )));
    }
    Ok(bytes)
}
