use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult, NotifyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TestResult,
    LoadTestResult,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TestResult => "test_result",
            Self::LoadTestResult => "load_test_result",
        }
    }
}

#[derive(Serialize)]
struct Envelope<'payload, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'payload T,
    timestamp: DateTime<Utc>,
}

/// Serializes `{ "type", "data", "timestamp" }` for `data`.
///
/// # Errors
///
/// Returns an error when `data` cannot be represented as JSON.
pub fn encode_event<T>(kind: EventKind, data: &T) -> AppResult<Bytes>
where
    T: Serialize,
{
    let envelope = Envelope {
        kind: kind.as_str(),
        data,
        timestamp: Utc::now(),
    };
    serde_json::to_vec(&envelope).map(Bytes::from).map_err(|err| {
        AppError::notify(NotifyError::Encode {
            kind: kind.as_str(),
            source: err,
        })
    })
}
