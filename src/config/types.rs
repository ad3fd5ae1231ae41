use std::time::Duration;

use serde::Deserialize;

use crate::args::OutputFormat;
use crate::error::ValidationError;

/// Settings read from `api-monitor.toml` / `api-monitor.json`. Every field is
/// optional; command-line values take precedence.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub timeout: Option<DurationValue>,
    pub default_requests: Option<usize>,
    pub default_concurrency: Option<usize>,
    pub outcome_capacity: Option<usize>,
    pub summary_capacity: Option<usize>,
    pub event_capacity: Option<usize>,
    pub db: Option<String>,
    pub output: Option<OutputFormat>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
