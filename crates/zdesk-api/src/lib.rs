//! Zendesk Support API client for zdesk.
//!
//! One method per supported operation, a shared retry loop underneath:
//! transient failures (timeouts, 5xx, rate limits) are retried with
//! exponential backoff, everything else surfaces immediately as a typed
//! error. Callers never see retries, only latency.

pub mod client;
pub mod retry;

pub use client::ZendeskClient;
pub use retry::RetryPolicy;
