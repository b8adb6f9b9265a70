//! HTTP client layer: `StorefrontHttp` with per-endpoint retry policies.

pub mod client;
pub mod envelope;
pub mod retry;

pub use client::{RequestOptions, StorefrontHttp};
pub use retry::{RetryConfig, RetryPolicy};
