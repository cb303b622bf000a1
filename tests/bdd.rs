//! Runs the feature files under `tests/features` through the real step
//! bindings, against a local site.

// only the axum site is used here
#[allow(dead_code)]
mod common;

use cucumber::World;
use sitecheck::HarnessConfig;
use sitecheck::steps::{self, WebsiteWorld};

#[tokio::main]
async fn main() {
    let site = common::spawn_site();
    let config = HarnessConfig::default()
        .with_base_url(&site.base_url())
        .expect("base url");
    steps::configure(config);

    WebsiteWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("tests/features")
        .await;
}
