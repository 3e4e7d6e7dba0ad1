pub mod models;

pub use models::{Config, FileConfig, PropagationConfig, PropagationFile};

use std::{fs::File, io::Read, path::Path, time::Duration};

use anyhow::{anyhow, Context, Result};
use validator::Validate;

use crate::cli::Cli;
use crate::propagation::DEFAULT_RESOLVER_URL;
use crate::reconciler::{validate_ipv4, DEFAULT_TTL};
use crate::rollout::{DEFAULT_MONITORING_SUBDOMAINS, DEFAULT_SUBDOMAINS};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROPAGATION_ATTEMPTS: u32 = 10;
pub const DEFAULT_PROPAGATION_INTERVAL_SECS: u64 = 6;

pub fn load_file(config_file: &Path) -> Result<FileConfig> {
    let mut file = File::open(config_file)
        .with_context(|| format!("Failed to open config file: {}", config_file.display()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .with_context(|| format!("Failed to read config file: {}", config_file.display()))?;

    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", config_file.display()))
}

fn required(flag: Option<&String>, file: Option<String>, name: &str) -> Result<String> {
    flag.cloned()
        .or(file)
        .ok_or_else(|| anyhow!("Missing required parameter {}", name))
}

impl Config {
    /// Loads the file named by `--config` (if any) and layers the flags over it.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => load_file(path)?,
            None => FileConfig::default(),
        };
        Self::from_parts(cli, file)
    }

    pub fn from_parts(cli: &Cli, file: FileConfig) -> Result<Self> {
        let propagation = file.propagation.unwrap_or_default();

        let config = Config {
            api_token: required(
                cli.api_token.as_ref(),
                file.api_token,
                "--api-token (or CLOUDFLARE_API_TOKEN)",
            )?,
            zone_id: required(
                cli.zone_id.as_ref(),
                file.zone_id,
                "--zone-id (or CLOUDFLARE_ZONE_ID)",
            )?,
            domain: required(cli.domain.as_ref(), file.domain, "--domain")?,
            server_ip: required(cli.server_ip.as_ref(), file.server_ip, "--server-ip")?,
            ttl: cli.ttl.or(file.ttl).unwrap_or(DEFAULT_TTL),
            proxied: match (cli.proxied, cli.no_proxied) {
                (true, _) => true,
                (_, true) => false,
                _ => file.proxied.unwrap_or(false),
            },
            timeout_secs: cli
                .timeout
                .or(file.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            concurrency: cli.concurrency.or(file.concurrency).unwrap_or(1),
            monitoring: !cli.no_monitoring && file.monitoring.unwrap_or(true),
            subdomains: file
                .subdomains
                .unwrap_or_else(|| DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect()),
            monitoring_subdomains: file.monitoring_subdomains.unwrap_or_else(|| {
                DEFAULT_MONITORING_SUBDOMAINS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            propagation: PropagationConfig {
                enabled: cli.verify || propagation.enabled.unwrap_or(false),
                resolver_url: propagation
                    .resolver_url
                    .unwrap_or_else(|| DEFAULT_RESOLVER_URL.to_string()),
                attempts: propagation.attempts.unwrap_or(DEFAULT_PROPAGATION_ATTEMPTS),
                interval_secs: propagation
                    .interval_secs
                    .unwrap_or(DEFAULT_PROPAGATION_INTERVAL_SECS),
            },
        };

        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        validate_ipv4(&config.server_ip).map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
