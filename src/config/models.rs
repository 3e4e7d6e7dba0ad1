use serde::Deserialize;
use std::fmt;
use validator::Validate;

/// On-disk configuration. Every field is optional so flags can fill the gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_token: Option<String>,
    pub zone_id: Option<String>,
    pub domain: Option<String>,
    pub server_ip: Option<String>,
    pub ttl: Option<u32>,
    pub proxied: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub monitoring: Option<bool>,
    pub subdomains: Option<Vec<String>>,
    pub monitoring_subdomains: Option<Vec<String>>,
    pub propagation: Option<PropagationFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropagationFile {
    pub enabled: Option<bool>,
    pub resolver_url: Option<String>,
    pub attempts: Option<u32>,
    pub interval_secs: Option<u64>,
}

#[derive(Clone, Validate)]
pub struct Config {
    #[validate(length(min = 1, message = "API token cannot be empty"))]
    pub api_token: String,

    #[validate(length(min = 1, message = "Zone ID cannot be empty"))]
    pub zone_id: String,

    #[validate(length(min = 1, message = "Domain cannot be empty"))]
    pub domain: String,

    #[validate(length(min = 1, message = "Server IP cannot be empty"))]
    pub server_ip: String,

    #[validate(range(min = 1, message = "TTL must be greater than 0"))]
    pub ttl: u32,

    pub proxied: bool,

    #[validate(range(min = 1, message = "Timeout must be at least one second"))]
    pub timeout_secs: u64,

    #[validate(range(min = 1, max = 16, message = "Concurrency must be between 1 and 16"))]
    pub concurrency: usize,

    pub monitoring: bool,
    pub subdomains: Vec<String>,
    pub monitoring_subdomains: Vec<String>,

    #[validate(nested)]
    pub propagation: PropagationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct PropagationConfig {
    pub enabled: bool,

    #[validate(length(min = 1, message = "Resolver URL cannot be empty"))]
    pub resolver_url: String,

    #[validate(range(min = 1, max = 100, message = "Attempts must be between 1 and 100"))]
    pub attempts: u32,

    pub interval_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("zone_id", &self.zone_id)
            .field("domain", &self.domain)
            .field("server_ip", &self.server_ip)
            .field("ttl", &self.ttl)
            .field("proxied", &self.proxied)
            .field("timeout_secs", &self.timeout_secs)
            .field("concurrency", &self.concurrency)
            .field("monitoring", &self.monitoring)
            .field("subdomains", &self.subdomains)
            .field("monitoring_subdomains", &self.monitoring_subdomains)
            .field("propagation", &self.propagation)
            .finish()
    }
}
