//! bridgecheck API transport
//!
//! Drives the bridge through its HTTP REST API gateway.

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod scenarios;

pub use client::ApiTransport;
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use message::ApiMessage;
pub use scenarios::registry;
