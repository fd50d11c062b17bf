//! HTTP access to the monitoring backend.

mod cached_client;
mod client;
mod error;
pub mod hooks;
pub mod messages;
mod session;
pub mod types;
pub mod wire;

pub use cached_client::{CachedApiClient, PreloadSummary};
pub use client::{ApiClient, RequestOptions};
pub use error::ApiError;
pub use hooks::{ApiHooks, LoadingSink, Notifier, Severity};
pub use session::SessionStore;
