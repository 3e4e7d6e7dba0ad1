use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, warn};

use fks_dns::{
    api::CloudflareClient,
    cli::Cli,
    config::Config,
    propagation::PropagationChecker,
    reconciler::{RecordDefaults, Reconciler},
    rollout::{build_worklist, Rollout},
};

const EXIT_RECORD_FAILED: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match Config::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    tokio::select! {
        result = run(&config) => match result {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::from(EXIT_RECORD_FAILED),
            Err(e) => {
                error!("{:#}", e);
                ExitCode::from(EXIT_CONFIG)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; remaining records were not reconciled");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(config: &Config) -> Result<bool> {
    let client = CloudflareClient::new(config.api_token.clone(), config.timeout())
        .context("Failed to build Cloudflare client")?;
    let reconciler = Reconciler::new(
        client,
        config.zone_id.clone(),
        RecordDefaults {
            ttl: config.ttl,
            proxied: config.proxied,
        },
    );

    let monitoring = config
        .monitoring
        .then_some(config.monitoring_subdomains.as_slice());
    let worklist = build_worklist(&config.domain, &config.subdomains, monitoring);

    let mut rollout = Rollout::new(&reconciler, config.server_ip.clone())
        .concurrency(config.concurrency);
    if config.propagation.enabled {
        let checker = PropagationChecker::new(
            config.propagation.resolver_url.clone(),
            config.propagation.attempts,
            Duration::from_secs(config.propagation.interval_secs),
            config.timeout(),
        )
        .context("Failed to build resolver client")?;
        rollout = rollout.verify_with(checker);
    }

    let report = rollout.run(worklist).await;
    Ok(report.is_success())
}
