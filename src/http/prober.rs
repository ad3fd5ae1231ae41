use std::error::Error as StdError;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::domain::{ProbeOutcome, UNREACHED_STATUS};
use crate::error::AppResult;

use super::client::build_client;

/// Issues single GET probes over a shared client.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn with_timeout(request_timeout: Duration) -> AppResult<Self> {
        Ok(Self::new(build_client(request_timeout)?))
    }

    /// Probes `url` once.
    ///
    /// Never fails: malformed URLs, DNS/TLS/connect errors, timeouts and
    /// body read failures all come back as an unsuccessful outcome.
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();

        let target = match Url::parse(url) {
            Ok(target) => target,
            Err(err) => {
                debug!("Rejected probe URL '{}': {}", url, err);
                return ProbeOutcome::failed(
                    url,
                    UNREACHED_STATUS,
                    elapsed_ms(start),
                    format!("invalid URL: {}", err),
                );
            }
        };

        let response = match self.client.get(target).send().await {
            Ok(response) => response,
            Err(err) => {
                let message = describe_error(&err);
                debug!("Probe to {} failed: {}", url, message);
                return ProbeOutcome::failed(url, UNREACHED_STATUS, elapsed_ms(start), message);
            }
        };

        let status = response.status().as_u16();
        match drain_response_body(response).await {
            Ok(bytes) => {
                let outcome = ProbeOutcome::completed(url, status, elapsed_ms(start), bytes);
                debug!(
                    "Probe to {} returned {} in {}ms",
                    url, outcome.status, outcome.duration_ms
                );
                outcome
            }
            Err(err) => {
                let message = describe_error(&err);
                debug!("Failed to read response body from {}: {}", url, message);
                ProbeOutcome::failed(url, status, elapsed_ms(start), message)
            }
        }
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Flattens an error and its sources into one line.
fn describe_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
