use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Default, Parser)]
#[command(
    name = "fks-dns",
    version,
    about = "Point a domain's Cloudflare A records at a server"
)]
pub struct Cli {
    /// YAML config file; flags and environment override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bare domain, e.g. example.com
    #[arg(long, env = "FKS_DOMAIN")]
    pub domain: Option<String>,

    /// IPv4 address every record should point at
    #[arg(long, env = "FKS_SERVER_IP", value_name = "IPV4")]
    pub server_ip: Option<String>,

    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    #[arg(long, env = "CLOUDFLARE_ZONE_ID")]
    pub zone_id: Option<String>,

    /// Record TTL in seconds
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Route records through the Cloudflare proxy
    #[arg(long)]
    pub proxied: bool,

    /// Keep records DNS-only even if the config file sets `proxied: true`
    #[arg(long, conflicts_with = "proxied")]
    pub no_proxied: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of records reconciled at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Skip the monitoring subdomains
    #[arg(long)]
    pub no_monitoring: bool,

    /// Poll a public resolver until each record resolves
    #[arg(long)]
    pub verify: bool,
}
