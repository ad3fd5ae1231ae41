//! Core library for the `api-monitor` CLI.
//!
//! Probes HTTP endpoints once or as bounded-concurrency load tests, keeps a
//! bounded history of the results, and fans completion events out to
//! subscribers. [`monitor::Monitor`] ties the pieces together.
pub mod args;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod load;
pub mod logger;
pub mod monitor;
pub mod notify;
pub mod store;
