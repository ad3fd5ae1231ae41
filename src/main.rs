mod app;
mod args;
mod config;
mod domain;
mod entry;
mod error;
mod http;
mod load;
mod logger;
mod monitor;
mod notify;
mod store;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
