use std::time::Duration;

use reqwest::Client;
use tracing::error;

use crate::error::{AppError, AppResult, HttpError};

/// Per-request timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("api-monitor/", env!("CARGO_PKG_VERSION"));

/// Builds the shared, connection-pooling client used by every probe.
///
/// Certificate and hostname verification stay enabled.
///
/// # Errors
///
/// Returns an error when the TLS backend or client cannot be initialised.
pub fn build_client(request_timeout: Duration) -> AppResult<Client> {
    match Client::builder()
        .timeout(request_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
    {
        Ok(client) => Ok(client),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            Err(AppError::http(HttpError::BuildClientFailed { source: e }))
        }
    }
}
