//! HTTP fetching of remote mapping documents, with retry policies.

pub mod client;
pub mod retry;

pub use client::ConfigHttp;
pub use retry::{RetryConfig, RetryPolicy};
