//! Config handling

use std::time::Duration;

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;
use crate::constants::{
    DEFAULT_BODY_LIMIT, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::error::HarnessError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("ureq", LevelFilter::Warn)
            .with_module_level("ureq_proto", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// What a failed request does to the response kept from an earlier one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StaleResponsePolicy {
    /// Keep the earlier response; later assertions still see it.
    #[default]
    Keep,
    /// Forget it; later assertions report that no response is available.
    Clear,
}

/// Immutable settings for one harness and its client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarnessConfig {
    /// Relative request targets are resolved against this.
    pub base_url: Option<Url>,
    /// Overall deadline for each request and its body. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Redirects followed before giving up, `0` returns the redirect itself.
    pub max_redirects: u32,
    /// Sent as the User-Agent header.
    pub user_agent: String,
    /// Largest body content assertions will read.
    pub body_limit: u64,
    /// See [`StaleResponsePolicy`].
    pub stale_response: StaleResponsePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Some(DEFAULT_TIMEOUT),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            stale_response: StaleResponsePolicy::default(),
        }
    }
}

impl HarnessConfig {
    /// Builds the harness settings from the runner's command line.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, HarnessError> {
        let base_url = cli
            .base_url
            .as_deref()
            .map(parse_base_url)
            .transpose()?;
        let timeout = match cli.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let stale_response = if cli.clear_on_failure {
            StaleResponsePolicy::Clear
        } else {
            StaleResponsePolicy::Keep
        };

        Ok(Self {
            base_url,
            timeout,
            max_redirects: cli.max_redirects,
            user_agent: cli.user_agent.clone(),
            body_limit: cli.body_limit,
            stale_response,
        })
    }

    /// Sets the base for relative request targets.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, HarnessError> {
        self.base_url = Some(parse_base_url(base_url)?);
        Ok(self)
    }

    /// Sets the per-request deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many redirects are followed.
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Sets the stale response policy.
    pub fn with_stale_response(mut self, policy: StaleResponsePolicy) -> Self {
        self.stale_response = policy;
        self
    }

    /// Sets the body limit for content assertions.
    pub fn with_body_limit(mut self, body_limit: u64) -> Self {
        self.body_limit = body_limit;
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, HarnessError> {
    let url = Url::parse(raw).map_err(|err| HarnessError::malformed(raw, err))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HarnessError::malformed(raw, "base URL must be http or https"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        options: CliOptions,
    }

    #[test]
    fn defaults_are_bounded() {
        let config = HarnessConfig::default();
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(config.stale_response, StaleResponsePolicy::Keep);
        assert!(config.base_url.is_none());
        assert!(config.user_agent.starts_with("sitecheck/"));
    }

    #[test]
    fn cli_options_map_onto_config() {
        let cli = TestCli::parse_from([
            "sitecheck",
            "--base-url",
            "http://localhost:8080/app/",
            "--timeout-secs",
            "0",
            "--clear-on-failure",
            "--body-limit",
            "64",
            "--features",
            "tests/features",
        ]);
        let config = HarnessConfig::from_cli(&cli.options).expect("valid options");
        assert_eq!(
            config.base_url.as_ref().map(Url::as_str),
            Some("http://localhost:8080/app/")
        );
        assert_eq!(config.timeout, None);
        assert_eq!(config.stale_response, StaleResponsePolicy::Clear);
        assert_eq!(config.body_limit, 64);
    }

    #[test]
    fn base_url_must_be_web_url() {
        assert!(matches!(
            HarnessConfig::default().with_base_url("ftp://example.test/"),
            Err(HarnessError::MalformedInput { .. })
        ));
        assert!(matches!(
            HarnessConfig::default().with_base_url("not a url"),
            Err(HarnessError::MalformedInput { .. })
        ));
    }
}
