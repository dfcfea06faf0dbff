//! REST API client module for the cashbook service.
//!
//! This module provides the `ApiClient` for talking to the cashbook API:
//! authentication, cashbooks, transactions, lookups and reports.
//!
//! Every request carries the session's JWT bearer token. An expired access
//! token is renewed through `/api/auth/refresh/` and the request replayed once.

pub mod client;
pub mod error;
pub mod request;
pub mod resources;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::{ApiRequest, ApiResponse, ResponseBody, ResponseKind};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
