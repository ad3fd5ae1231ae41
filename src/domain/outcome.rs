use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status recorded when the request never reached the server.
pub const UNREACHED_STATUS: u16 = 0;
pub const PROBE_METHOD: &str = "GET";

/// Result of one HTTP probe.
///
/// `success` holds only when no transport error occurred and the status is
/// below 400; a probe that never reached the server carries
/// [`UNREACHED_STATUS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub id: String,
    pub url: String,
    pub method: String,
    pub status: u16,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub response_size: u64,
}

impl ProbeOutcome {
    /// Outcome for a response whose body was fully drained.
    #[must_use]
    pub fn completed(url: &str, status: u16, duration_ms: u64, response_size: u64) -> Self {
        Self {
            id: new_id(),
            url: url.to_owned(),
            method: PROBE_METHOD.to_owned(),
            status,
            duration_ms,
            timestamp: Utc::now(),
            success: status < 400,
            error: String::new(),
            response_size,
        }
    }

    /// Outcome for a transport-level failure.
    ///
    /// `status` is [`UNREACHED_STATUS`] unless headers already arrived before
    /// the failure.
    #[must_use]
    pub fn failed(url: &str, status: u16, duration_ms: u64, error: String) -> Self {
        Self {
            id: new_id(),
            url: url.to_owned(),
            method: PROBE_METHOD.to_owned(),
            status,
            duration_ms,
            timestamp: Utc::now(),
            success: false,
            error,
            response_size: 0,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub const fn reached_server(&self) -> bool {
        self.status != UNREACHED_STATUS
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_classifies_by_status() -> Result<(), String> {
        let ok = ProbeOutcome::completed("http://localhost", 204, 3, 0);
        if !ok.success || !ok.error.is_empty() {
            return Err("Expected 204 to be a success".to_owned());
        }
        let redirect = ProbeOutcome::completed("http://localhost", 399, 3, 0);
        if !redirect.success {
            return Err("Expected 399 to be a success".to_owned());
        }
        let client_error = ProbeOutcome::completed("http://localhost", 404, 3, 12);
        if client_error.success {
            return Err("Expected 404 to be a failure".to_owned());
        }
        if client_error.response_size != 12 {
            return Err("Expected response size to be kept for 4xx".to_owned());
        }
        Ok(())
    }

    #[test]
    fn failed_never_succeeds() -> Result<(), String> {
        let outcome = ProbeOutcome::failed(
            "http://fails.invalid",
            UNREACHED_STATUS,
            7,
            "dns error".to_owned(),
        );
        if outcome.success || outcome.reached_server() {
            return Err("Expected unreached failure".to_owned());
        }
        if outcome.response_size != 0 {
            return Err("Expected zero response size on failure".to_owned());
        }
        if outcome.method != PROBE_METHOD {
            return Err(format!("Unexpected method {}", outcome.method));
        }
        Ok(())
    }

    #[test]
    fn ids_are_unique_until_overridden() -> Result<(), String> {
        let first = ProbeOutcome::completed("http://localhost", 200, 1, 0);
        let second = ProbeOutcome::completed("http://localhost", 200, 1, 0);
        if first.id == second.id {
            return Err("Expected distinct ids".to_owned());
        }
        let renamed = second.with_id("batch-0".to_owned());
        if renamed.id != "batch-0" {
            return Err(format!("Unexpected id {}", renamed.id));
        }
        Ok(())
    }

    #[test]
    fn serializes_with_wire_names() -> Result<(), String> {
        let outcome = ProbeOutcome::completed("http://localhost", 200, 15, 10);
        let value = serde_json::to_value(&outcome).map_err(|err| err.to_string())?;
        if value.get("duration").and_then(serde_json::Value::as_u64) != Some(15) {
            return Err(format!("Missing duration field: {}", value));
        }
        if value.get("response_size").and_then(serde_json::Value::as_u64) != Some(10) {
            return Err(format!("Missing response_size field: {}", value));
        }
        if value.get("error").is_some() {
            return Err("Expected empty error to be omitted".to_owned());
        }
        Ok(())
    }
}
