//! `ermrest-fetch` is a resilient async HTTP client for ERMrest catalog
//! metadata (schemas, tables, columns, keys, foreign keys).
//!
//! Requests go through [`FetchClient`]:
//! - [`FetchClient::get`], [`FetchClient::post`], [`FetchClient::put`],
//!   [`FetchClient::delete`] for awaitable calls
//! - [`FetchClient::dispatch`] and [`FetchClient::dispatch_with_handler`] for
//!   continuation-style calls
//!
//! Each attempt is bounded by a uniform timeout. Timeouts, network failures
//! and 408/503/504 responses are retried with jittered exponential backoff
//! within a small budget; everything else is terminal and surfaced to the
//! caller or, failing that, to the user.
//!
//! Metadata documents are passed through as opaque [`serde_json::Value`]s.

mod busy;
mod client;
mod error;
mod options;
mod report;
mod request;
mod response;
pub mod retry;

pub use busy::{BusyGuard, BusyIndicator};
pub use client::FetchClient;
pub use error::FetchError;
pub use options::{ClientOptions, DEFAULT_USER_AGENT};
pub use report::{diagnostic_message, Alert, DefaultAlert, ErrorContext};
pub use request::{Method, RequestDescriptor, ResponseKind};
pub use response::{Payload, Success};
pub use retry::{RetryPolicy, Step};

pub type Result<T> = std::result::Result<T, FetchError>;
