use std::num::NonZeroUsize;
use std::time::Duration;

use crate::config::parse_duration_value;
use crate::error::ValidationError;

pub(super) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    parse_duration_value(s)
}

pub(super) fn parse_capacity(s: &str) -> Result<NonZeroUsize, String> {
    let value: usize = s
        .trim()
        .parse()
        .map_err(|err| format!("Invalid number '{}': {}", s, err))?;
    NonZeroUsize::new(value).ok_or_else(|| "Value must be >= 1.".to_owned())
}
