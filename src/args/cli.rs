use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::load::LoadDefaults;
use crate::store::StoreLimits;

use super::parsers::{parse_capacity, parse_duration_arg};
use super::types::OutputFormat;

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Probe a URL once and print the outcome
    Test(TestArgs),
    /// Run a load test against a URL
    Load(LoadArgs),
    /// List recent quick-probe results
    Results(ListArgs),
    /// List recent load-test summaries
    LoadResults(ListArgs),
    /// Show one load-test summary by id
    LoadResult(LookupArgs),
}

#[derive(Debug, Args, Clone)]
pub struct TestArgs {
    /// Target URL
    pub url: String,
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Target URL
    pub url: String,

    /// Total requests to issue (0 selects the default)
    #[arg(default_value_t = 0)]
    pub requests: usize,

    /// Requests in flight at once (0 selects the default)
    #[arg(default_value_t = 0)]
    pub concurrency: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    /// Maximum entries to show, most recent last (0 selects the default)
    #[arg(long, short = 'n', default_value_t = 0)]
    pub limit: usize,
}

#[derive(Debug, Args, Clone)]
pub struct LookupArgs {
    /// Load-test id
    pub id: String,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "api-monitor",
    version,
    about = "Probe HTTP endpoints and run bounded-concurrency load tests, keeping a short history of results.",
    next_help_heading = "Advanced Options"
)]
pub struct MonitorArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML or JSON)
    #[arg(long, short = 'c', global = true, help_heading = "Common Options")]
    pub config: Option<String>,

    /// SQLite file for result history (kept in memory when unset)
    #[arg(long, global = true, help_heading = "Common Options")]
    pub db: Option<PathBuf>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "30s",
        value_parser = parse_duration_arg,
        global = true,
        help_heading = "Common Options"
    )]
    pub request_timeout: Duration,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "text",
        global = true,
        help_heading = "Common Options"
    )]
    pub output: OutputFormat,

    /// Stream published events to stderr as JSON lines
    #[arg(long, global = true, help_heading = "Common Options")]
    pub events: bool,

    /// Enable debug logging
    #[arg(long, short, global = true, help_heading = "Common Options")]
    pub verbose: bool,

    /// Requests per load test when none are given
    #[arg(long = "default-requests", default_value = "100", value_parser = parse_capacity, global = true)]
    pub default_requests: NonZeroUsize,

    /// Concurrency per load test when none is given
    #[arg(long = "default-concurrency", default_value = "10", value_parser = parse_capacity, global = true)]
    pub default_concurrency: NonZeroUsize,

    /// Quick-probe outcomes retained before the oldest is evicted
    #[arg(long = "outcome-capacity", default_value = "1000", value_parser = parse_capacity, global = true)]
    pub outcome_capacity: NonZeroUsize,

    /// Load-test summaries retained before the oldest is evicted
    #[arg(long = "summary-capacity", default_value = "100", value_parser = parse_capacity, global = true)]
    pub summary_capacity: NonZeroUsize,

    /// Pending events buffered before new ones are dropped
    #[arg(long = "event-capacity", default_value = "256", value_parser = parse_capacity, global = true)]
    pub event_capacity: NonZeroUsize,
}

impl MonitorArgs {
    #[must_use]
    pub const fn store_limits(&self) -> StoreLimits {
        StoreLimits {
            outcome_capacity: self.outcome_capacity,
            summary_capacity: self.summary_capacity,
        }
    }

    #[must_use]
    pub const fn load_defaults(&self) -> LoadDefaults {
        LoadDefaults {
            total_requests: self.default_requests,
            concurrency: self.default_concurrency,
        }
    }
}
