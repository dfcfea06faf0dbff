//! Core library for cashbook: authenticated API client, session and
//! credential storage, configuration and domain models.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiRequest, ApiResponse, ResponseBody};
pub use auth::{Session, SessionEvent};
pub use config::{ClientConfig, Config};
