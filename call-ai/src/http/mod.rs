//! HTTP client building with retry middleware.

mod client;
mod retry;

pub use client::{check_status, HttpClientConfig, ServiceClient, ServiceClientBuilder};
pub use retry::BackoffPolicy;
