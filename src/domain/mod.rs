//! Records produced by probes and load tests.
mod outcome;
mod summary;

pub use outcome::{PROBE_METHOD, ProbeOutcome, UNREACHED_STATUS};
pub use summary::LoadTestSummary;
