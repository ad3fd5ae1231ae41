//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;


pub use cli::{Command, ListArgs, LoadArgs, LookupArgs, MonitorArgs, TestArgs};
pub use types::OutputFormat;
