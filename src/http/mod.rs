//! HTTP client construction and single-request probing.
mod client;
mod prober;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{DEFAULT_REQUEST_TIMEOUT, build_client};
pub use prober::Prober;
