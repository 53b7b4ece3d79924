// rwtool-api: Async Rust client for the report-distribution platform REST API

pub mod auth;
pub mod client;
mod domains;
pub mod error;
mod favorites;
mod folders;
mod reports;
mod subscriptions;
pub mod transport;
pub mod types;
mod user_groups;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use transport::TransportConfig;
