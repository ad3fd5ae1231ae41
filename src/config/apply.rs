use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::MonitorArgs;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Values given on the command
/// line are left untouched.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut MonitorArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration().map_err(|err| {
            AppError::config(ConfigError::InvalidField {
                field: "timeout",
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "db")
        && let Some(db) = config.db.as_ref()
    {
        args.db = Some(PathBuf::from(db));
    }

    if !is_cli(matches, "output")
        && let Some(output) = config.output
    {
        args.output = output;
    }

    apply_count(
        matches,
        "default_requests",
        config.default_requests,
        &mut args.default_requests,
    )?;
    apply_count(
        matches,
        "default_concurrency",
        config.default_concurrency,
        &mut args.default_concurrency,
    )?;
    apply_count(
        matches,
        "outcome_capacity",
        config.outcome_capacity,
        &mut args.outcome_capacity,
    )?;
    apply_count(
        matches,
        "summary_capacity",
        config.summary_capacity,
        &mut args.summary_capacity,
    )?;
    apply_count(
        matches,
        "event_capacity",
        config.event_capacity,
        &mut args.event_capacity,
    )?;

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn apply_count(
    matches: &ArgMatches,
    field: &'static str,
    value: Option<usize>,
    target: &mut NonZeroUsize,
) -> AppResult<()> {
    if is_cli(matches, field) {
        return Ok(());
    }
    if let Some(value) = value {
        *target = NonZeroUsize::new(value).ok_or_else(|| {
            AppError::config(ConfigError::InvalidField {
                field,
                source: ValidationError::CapacityZero { field },
            })
        })?;
    }
    Ok(())
}
