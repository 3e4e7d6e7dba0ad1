use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;
use tokio::time::sleep;

pub const DEFAULT_RESOLVER_URL: &str = "https://cloudflare-dns.com/dns-query";

// DNS RR type code for A.
const TYPE_A: u16 = 1;

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Confirmed { attempts: u32 },
    Pending,
}

/// Polls a public DNS-over-HTTPS resolver until a name resolves to the expected address.
#[derive(Debug, Clone)]
pub struct PropagationChecker {
    client: reqwest::Client,
    resolver_url: String,
    attempts: u32,
    interval: Duration,
}

impl PropagationChecker {
    pub fn new(
        resolver_url: impl Into<String>,
        attempts: u32,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            resolver_url: resolver_url.into(),
            attempts: attempts.max(1),
            interval,
        })
    }

    pub async fn wait_for(&self, name: &str, expected: &str) -> Propagation {
        for attempt in 1..=self.attempts {
            match self.resolve(name).await {
                Ok(addresses) if addresses.iter().any(|a| a == expected) => {
                    return Propagation::Confirmed { attempts: attempt };
                }
                Ok(addresses) => {
                    debug!(
                        "{} resolves to {:?}, waiting for {} (attempt {}/{})",
                        name, addresses, expected, attempt, self.attempts
                    );
                }
                Err(e) => {
                    warn!("Resolver lookup for {} failed: {}", name, e);
                }
            }

            if attempt < self.attempts {
                sleep(self.interval).await;
            }
        }

        Propagation::Pending
    }

    async fn resolve(&self, name: &str) -> Result<Vec<String>, reqwest::Error> {
        let response: DohResponse = self
            .client
            .get(&self.resolver_url)
            .query(&[("name", name), ("type", "A")])
            .header("accept", "application/dns-json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Non-zero status is NXDOMAIN/SERVFAIL and friends.
        if response.status != 0 {
            return Ok(Vec::new());
        }

        Ok(response
            .answer
            .into_iter()
            .filter(|answer| answer.record_type == TYPE_A)
            .map(|answer| answer.data)
            .collect())
    }
}
