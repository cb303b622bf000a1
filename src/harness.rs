//! One GET at a time, and assertions against whatever came back last.
//!
//! A harness belongs to a single scenario. It owns its HTTP client for its
//! whole life and keeps only the most recent response; each successful
//! request replaces it outright.

use std::fmt;
use std::time::Instant;

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, info, warn};
use ureq::http::HeaderMap;
use ureq::http::header::CONTENT_TYPE;
use url::Url;

use crate::client::{BodyReader, FetchedResponse, HttpFetch, UreqFetcher, read_limited};
use crate::config::{HarnessConfig, StaleResponsePolicy};
use crate::constants::NO_VALUE;
use crate::error::HarnessError;
use crate::status_codes;

/// Longest piece of a body quoted in a failed content assertion.
const EXCERPT_CHARS: usize = 200;

enum BodyState {
    Unread(BodyReader),
    Loaded(String),
    Failed(String),
}

impl fmt::Debug for BodyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyState::Unread(_) => f.write_str("Unread"),
            BodyState::Loaded(text) => write!(f, "Loaded({} bytes)", text.len()),
            BodyState::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}

/// The response kept from the most recent successful request.
#[derive(Debug)]
pub struct LastResponse {
    url: Url,
    status: u16,
    headers: HeaderMap,
    body: BodyState,
}

impl LastResponse {
    fn new(url: Url, fetched: FetchedResponse) -> Self {
        Self {
            url,
            status: fetched.status,
            headers: fetched.headers,
            body: BodyState::Unread(fetched.body),
        }
    }

    /// The URL that was requested.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Numeric status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw Content-Type header, if the response had one.
    pub fn content_type(&self) -> Option<String> {
        self.headers
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }

    /// Reads the body on first use, then hands back the same text.
    fn text(&mut self, limit: u64) -> Result<&str, HarnessError> {
        let state = std::mem::replace(&mut self.body, BodyState::Failed(String::new()));
        self.body = match state {
            BodyState::Unread(mut reader) => match read_limited(&mut reader, limit) {
                Ok(bytes) => {
                    BodyState::Loaded(decode_body(&bytes, self.content_type().as_deref()))
                }
                Err(err) => BodyState::Failed(err.to_string()),
            },
            other => other,
        };

        match &self.body {
            BodyState::Loaded(text) => Ok(text),
            BodyState::Failed(reason) => Err(HarnessError::transport(self.url.as_str(), reason)),
            BodyState::Unread(_) => Err(HarnessError::transport(
                self.url.as_str(),
                "response body was not read",
            )),
        }
    }
}

/// Issues GET requests and checks the response they produced.
#[derive(Debug)]
pub struct HttpAssertionHarness<F = UreqFetcher> {
    client: F,
    config: HarnessConfig,
    last_response: Option<LastResponse>,
}

impl HttpAssertionHarness<UreqFetcher> {
    /// Creates a harness with a fresh [`UreqFetcher`] built from `config`.
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        let client = UreqFetcher::new(&config);
        Self::with_client(client, config)
    }
}

impl<F: HttpFetch> HttpAssertionHarness<F> {
    /// Creates a harness around any [`HttpFetch`] implementation.
    pub fn with_client(client: F, config: HarnessConfig) -> Result<Self, HarnessError> {
        status_codes::init()?;
        Ok(Self {
            client,
            config,
            last_response: None,
        })
    }

    /// The settings this harness was built with.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The response the assertions currently read from.
    pub fn last_response(&self) -> Option<&LastResponse> {
        self.last_response.as_ref()
    }

    /// Turns a step's request target into an absolute http(s) URL.
    ///
    /// Relative targets are only accepted when a base URL is configured.
    pub fn resolve_target(&self, target: &str) -> Result<Url, HarnessError> {
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return Err(HarnessError::malformed(target, "request target is empty"));
        }

        let url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.config.base_url {
                Some(base) => base
                    .join(trimmed)
                    .map_err(|err| HarnessError::malformed(target, err))?,
                None => {
                    return Err(HarnessError::malformed(
                        target,
                        "relative target given but no base URL is configured",
                    ));
                }
            },
            Err(err) => return Err(HarnessError::malformed(target, err)),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(HarnessError::malformed(
                target,
                format!("unsupported scheme {:?}", url.scheme()),
            ));
        }
        if url.host().is_none() {
            return Err(HarnessError::malformed(target, "URL has no host"));
        }
        Ok(url)
    }

    /// GETs `target` and keeps the response for later assertions.
    ///
    /// Blocks until a response arrives or the configured timeout expires.
    pub fn issue_request(&mut self, target: &str) -> Result<(), HarnessError> {
        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);
        self.issue(target, deadline)
    }

    /// Like [`issue_request`](Self::issue_request), bounded by `deadline`
    /// rather than the configured timeout.
    pub fn issue_request_until(
        &mut self,
        target: &str,
        deadline: Instant,
    ) -> Result<(), HarnessError> {
        self.issue(target, Some(deadline))
    }

    fn issue(&mut self, target: &str, deadline: Option<Instant>) -> Result<(), HarnessError> {
        let url = self.resolve_target(target)?;
        info!("GET {}", url);

        match self.client.get(&url, deadline) {
            Ok(fetched) => {
                debug!("{} returned {}", url, status_codes::describe(fetched.status));
                self.last_response = Some(LastResponse::new(url, fetched));
                Ok(())
            }
            Err(err) => {
                warn!("{}", err);
                if self.config.stale_response == StaleResponsePolicy::Clear {
                    self.last_response = None;
                }
                Err(err)
            }
        }
    }

    /// Checks the status against a code (`404`), name (`NotFound`) or
    /// reason phrase (`Not Found`).
    pub fn assert_status_code(&self, expected: &str) -> Result<(), HarnessError> {
        let response = self.require_response("response code")?;
        if status_codes::status_matches(expected, response.status)? {
            debug!("response code {} matches {:?}", response.status, expected);
            return Ok(());
        }
        Err(HarnessError::AssertionMismatch {
            subject: "response code",
            expected: expected.trim().to_string(),
            actual: status_codes::describe(response.status),
        })
    }

    /// Checks the Content-Type header, compared in its normalised form.
    ///
    /// An empty `expected` asserts that the response has no content type.
    pub fn assert_content_type(&self, expected: &str) -> Result<(), HarnessError> {
        let response = self.require_response("response type")?;
        let actual = response
            .content_type()
            .map(|raw| render_media_type(&raw))
            .unwrap_or_else(|| NO_VALUE.to_string());
        if render_media_type(expected) == actual {
            debug!("response type {:?} matches {:?}", actual, expected);
            return Ok(());
        }
        Err(HarnessError::AssertionMismatch {
            subject: "response type",
            expected: expected.trim().to_string(),
            actual,
        })
    }

    /// Reads the whole body and checks it contains `expected` verbatim.
    ///
    /// The body is decoded with the charset the Content-Type declares,
    /// falling back to UTF-8. Undecodable bytes become U+FFFD.
    pub fn assert_content_contains(&mut self, expected: &str) -> Result<(), HarnessError> {
        let limit = self.config.body_limit;
        let response = self
            .last_response
            .as_mut()
            .ok_or(HarnessError::NoResponseAvailable {
                assertion: "content",
            })?;
        let text = response.text(limit)?;
        if text.contains(expected) {
            debug!("content contains {:?}", expected);
            return Ok(());
        }
        Err(HarnessError::AssertionMismatch {
            subject: "content containing",
            expected: expected.to_string(),
            actual: excerpt(text),
        })
    }

    fn require_response(&self, assertion: &'static str) -> Result<&LastResponse, HarnessError> {
        self.last_response
            .as_ref()
            .ok_or(HarnessError::NoResponseAvailable { assertion })
    }
}

/// Renders a media type the way HTTP stacks print it:
/// `type/subtype; name=value`, with case folded where it is insensitive.
pub fn render_media_type(raw: &str) -> String {
    let mut segments = split_unquoted(raw, ';').into_iter();
    let essence = segments
        .next()
        .map(|essence| essence.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let mut rendered = essence;
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        rendered.push_str("; ");
        match segment.split_once('=') {
            Some((name, value)) => {
                rendered.push_str(&name.trim().to_ascii_lowercase());
                rendered.push('=');
                rendered.push_str(&unquote(value.trim()));
            }
            None => rendered.push_str(segment),
        }
    }
    rendered
}

fn split_unquoted(raw: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (idx, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            c if c == separator && !quoted => {
                parts.push(&raw[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

/// Strips surrounding quotes and resolves `\x` quoted pairs inside them.
fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut unescaped = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            c => unescaped.push(c),
        }
    }
    unescaped
}

/// The `charset` parameter of a Content-Type value, if it has one.
fn charset_of(content_type: &str) -> Option<String> {
    split_unquoted(content_type, ';')
        .into_iter()
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| unquote(value.trim()))
}

/// Decodes a body by its declared charset; unknown or missing labels mean UTF-8.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_of)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("body had bytes that are not valid {}", encoding.name());
    }
    text.into_owned()
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
