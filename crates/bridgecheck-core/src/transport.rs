//! Transport abstraction for the harness
//!
//! Each protocol adapter (HTTP API, XMPP, ...) implements [`Transport`]. The
//! harness only needs three things from it: how to open a session from
//! configuration, what to print while doing so, and how to tear it down.
//! Everything a scenario does with the session is adapter-specific and lives
//! in the adapter's scenario bodies.

use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::ConfigError;

/// A connected session to the system under test
#[async_trait]
pub trait Transport: Send + Sync + Sized + 'static {
    /// Adapter configuration, read from the `[transport]` table
    type Config: Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync;

    /// Adapter error type for setup and teardown
    type Error: std::error::Error + Send + Sync + 'static;

    /// Line printed before the session is opened
    const INIT_NOTICE: &'static str;

    /// Reject adapter configuration that cannot possibly connect
    fn validate_config(_config: &Self::Config) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Open and authenticate a session
    async fn connect(config: &Self::Config) -> Result<Self, Self::Error>;

    /// Release the session. Best-effort; the harness bounds how long it waits.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}
