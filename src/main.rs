use anyhow::Context;
use cucumber::{World, cli};
use sitecheck::cli::CliOptions;
use sitecheck::config::{HarnessConfig, setup_logging};
use sitecheck::steps::{self, WebsiteWorld};
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let opts = cli::Opts::<_, _, _, CliOptions>::parsed();
    let options = opts.custom.clone();

    let _ = setup_logging(options.debug);

    let config = HarnessConfig::from_cli(&options).context("Invalid harness configuration")?;
    if let Some(base_url) = &config.base_url {
        info!("Resolving relative targets against {}", base_url);
    }
    steps::configure(config);

    info!("Running features from {}", options.features.display());
    WebsiteWorld::cucumber()
        .fail_on_skipped()
        .with_cli(opts)
        .run_and_exit(options.features)
        .await;
    Ok(())
}
