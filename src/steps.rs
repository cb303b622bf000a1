//! Cucumber bindings for [`HttpAssertionHarness`].
//!
//! Every scenario gets its own [`WebsiteWorld`] and so its own harness.
//! Steps that touch the network run on Tokio's blocking pool, which keeps
//! a slow site from stalling other scenarios.
//!
//! ```text
//! Scenario: Home page
//!   When https://example.test/ is requested
//!   Then The response code should be OK
//!   And The response type should be text/html; charset=utf-8
//!   And The content should contain 'Welcome'
//! ```

use std::sync::OnceLock;

use cucumber::{World, given, then, when};
use tokio::task;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::harness::HttpAssertionHarness;

static RUN_CONFIG: OnceLock<HarnessConfig> = OnceLock::new();

/// Sets the config every scenario's harness is built from.
///
/// Only the first call has any effect; returns false for later calls.
pub fn configure(config: HarnessConfig) -> bool {
    RUN_CONFIG.set(config).is_ok()
}

fn run_config() -> HarnessConfig {
    RUN_CONFIG.get().cloned().unwrap_or_default()
}

/// Per-scenario state: the harness, built on first use.
#[derive(Debug, Default, World)]
pub struct WebsiteWorld {
    harness: Option<HttpAssertionHarness>,
}

impl WebsiteWorld {
    fn take_harness(&mut self) -> Result<HttpAssertionHarness, HarnessError> {
        match self.harness.take() {
            Some(harness) => Ok(harness),
            None => HttpAssertionHarness::new(run_config()),
        }
    }

    fn harness(&mut self) -> Result<&mut HttpAssertionHarness, HarnessError> {
        let harness = self.take_harness()?;
        Ok(self.harness.insert(harness))
    }

    /// Runs `op` against the harness on the blocking pool.
    ///
    /// If the task dies the harness goes with it; the next step starts
    /// from a fresh one.
    async fn blocking<R, F>(&mut self, op: F) -> Result<R, HarnessError>
    where
        F: FnOnce(&mut HttpAssertionHarness) -> Result<R, HarnessError> + Send + 'static,
        R: Send + 'static,
    {
        let mut harness = self.take_harness()?;
        let joined = task::spawn_blocking(move || {
            let result = op(&mut harness);
            (harness, result)
        })
        .await;

        match joined {
            Ok((harness, result)) => {
                self.harness = Some(harness);
                result
            }
            Err(err) => Err(HarnessError::Interrupted(err.to_string())),
        }
    }
}

async fn request(world: &mut WebsiteWorld, url: String) -> Result<(), HarnessError> {
    world
        .blocking(move |harness| harness.issue_request(&url))
        .await
}

#[given(regex = r"^(.+) is requested$")]
async fn given_url_is_requested(world: &mut WebsiteWorld, url: String) -> Result<(), HarnessError> {
    request(world, url).await
}

#[when(regex = r"^(.+) is requested$")]
async fn url_is_requested(world: &mut WebsiteWorld, url: String) -> Result<(), HarnessError> {
    request(world, url).await
}

#[then(regex = r"^The response code should be (.+)$")]
fn response_code_should_be(world: &mut WebsiteWorld, code: String) -> Result<(), HarnessError> {
    world.harness()?.assert_status_code(&code)
}

#[then(regex = r"^The response type should be (.*)$")]
fn response_type_should_be(
    world: &mut WebsiteWorld,
    media_type: String,
) -> Result<(), HarnessError> {
    world.harness()?.assert_content_type(&media_type)
}

#[then(regex = r"^The content should contain '(.*)'$")]
async fn content_should_contain(
    world: &mut WebsiteWorld,
    value: String,
) -> Result<(), HarnessError> {
    world
        .blocking(move |harness| harness.assert_content_contains(&value))
        .await
}
