//! HTTP client for a remote record collection.
//!
//! [`api::CatalogApi`] wraps the four REST endpoints of one collection.
//! [`client::CatalogClient`] owns the local mirror and the form state and
//! only patches local state after the server confirms a mutation.

pub mod api;
pub mod client;
pub mod config;
pub mod error;

pub use api::CatalogApi;
pub use client::CatalogClient;
pub use config::ClientConfig;
pub use error::ClientError;
