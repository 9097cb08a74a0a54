//! bridgecheck core
//!
//! Protocol-agnostic scenario execution for messaging-bridge conformance
//! checks:
//!
//! - [`ScenarioRegistry`] maps a scenario name to a body for one transport
//! - [`runner::run`] launches the bound body on its own task
//! - [`supervise`] races the result against a wall-clock deadline
//! - [`Outcome`] is the single reported result and its exit code
//!
//! Protocol adapters implement [`Transport`] and hand a registry to
//! [`Harness`], which drives one invocation end to end.

pub mod cli;
pub mod config;
pub mod error;
pub mod harness;
pub mod logging;
pub mod outcome;
pub mod registry;
pub mod runner;
pub mod supervisor;
pub mod transport;

pub use cli::{Cli, Invocation};
pub use config::{ConfigError, HarnessConfig, HarnessSettings};
pub use error::{BoxError, HarnessError, Result, ScenarioError};
pub use harness::Harness;
pub use outcome::{Outcome, EXIT_FAILURE, EXIT_SUCCESS};
pub use registry::{Scenario, ScenarioFn, ScenarioFuture, ScenarioRegistry};
pub use runner::RunningScenario;
pub use supervisor::supervise;
pub use transport::Transport;

// Scenario bodies take a cancellation token; re-exported so adapters need no direct dependency.
pub use tokio_util::sync::CancellationToken;
