mod app;
mod config;
mod http;
mod load;
mod notify;
mod store;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use load::LoadError;
pub use notify::NotifyError;
pub use store::StoreError;
pub use validation::ValidationError;
