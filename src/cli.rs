//! CLI parser
//!
//! These options are flattened into cucumber's own, so flags such as
//! `--name`, `--tags` and `--concurrency` come from cucumber itself.
use clap::Args;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_BODY_LIMIT, DEFAULT_FEATURES_PATH, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};

#[derive(Args, Clone, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, default_value = DEFAULT_FEATURES_PATH, env = "SITECHECK_FEATURES")]
    /// Feature file or directory of feature files to run.
    /// Env: SITECHECK_FEATURES
    pub features: PathBuf,
    #[clap(long, help = "Enable debug logging", env = "SITECHECK_DEBUG")]
    /// Enable debug logging. Env: SITECHECK_DEBUG
    pub debug: bool,
    #[clap(long, env = "SITECHECK_BASE_URL")]
    /// Base URL that relative targets like `/about` are resolved against.
    /// Env: SITECHECK_BASE_URL
    pub base_url: Option<String>,
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "SITECHECK_TIMEOUT_SECS")]
    /// Per-request deadline in seconds, `0` waits forever.
    /// Env: SITECHECK_TIMEOUT_SECS
    pub timeout_secs: u64,
    #[clap(long, default_value_t = DEFAULT_MAX_REDIRECTS, env = "SITECHECK_MAX_REDIRECTS")]
    /// Redirects to follow before giving up.
    /// Env: SITECHECK_MAX_REDIRECTS
    pub max_redirects: u32,
    #[clap(long, default_value = DEFAULT_USER_AGENT, env = "SITECHECK_USER_AGENT")]
    /// User-Agent header sent with every request.
    /// Env: SITECHECK_USER_AGENT
    pub user_agent: String,
    #[clap(long, default_value_t = DEFAULT_BODY_LIMIT, env = "SITECHECK_BODY_LIMIT")]
    /// Largest body in bytes that content checks will read.
    /// Env: SITECHECK_BODY_LIMIT
    pub body_limit: u64,
    #[clap(long, env = "SITECHECK_CLEAR_ON_FAILURE")]
    /// Forget the previous response when a request fails.
    /// Env: SITECHECK_CLEAR_ON_FAILURE
    pub clear_on_failure: bool,
}
