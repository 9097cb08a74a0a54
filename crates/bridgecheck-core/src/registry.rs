//! Scenario Registry
//!
//! Fixed mapping from scenario name to scenario body. Bodies are registered
//! against a transport type `T` but receive the live transport only when
//! [`Scenario::bind`] is called, so an unknown name is rejected before any
//! connection to the system under test is attempted.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::{HarnessError, ScenarioError};

/// Future returned by every scenario body
pub type ScenarioFuture = BoxFuture<'static, Result<(), ScenarioError>>;

/// A scenario closed over its transport, ready to launch.
///
/// The token is fired by the deadline supervisor when it stops waiting; bodies
/// that loop on inbound traffic should select on it.
pub type ScenarioFn = Box<dyn FnOnce(CancellationToken) -> ScenarioFuture + Send>;

type ScenarioBody<T> = Arc<dyn Fn(Arc<T>, CancellationToken) -> ScenarioFuture + Send + Sync>;

// ----------------------------------------------------------------------------
// Scenario
// ----------------------------------------------------------------------------

/// One registered behavioral check
pub struct Scenario<T> {
    name: &'static str,
    description: &'static str,
    body: ScenarioBody<T>,
}

impl<T> Clone for Scenario<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            description: self.description,
            body: Arc::clone(&self.body),
        }
    }
}

impl<T> std::fmt::Debug for Scenario<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

impl<T: Send + Sync + 'static> Scenario<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Close the scenario over a live transport session
    pub fn bind(&self, transport: Arc<T>) -> ScenarioFn {
        let body = Arc::clone(&self.body);
        Box::new(move |cancel| body(transport, cancel))
    }
}

// ----------------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------------

/// Name-keyed catalog of scenarios for one transport
pub struct ScenarioRegistry<T> {
    scenarios: BTreeMap<&'static str, Scenario<T>>,
}

impl<T> Default for ScenarioRegistry<T> {
    fn default() -> Self {
        Self {
            scenarios: BTreeMap::new(),
        }
    }
}

impl<T: Send + Sync + 'static> ScenarioRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario body under a unique name
    pub fn register<F, Fut>(
        &mut self,
        name: &'static str,
        description: &'static str,
        body: F,
    ) -> Result<(), HarnessError>
    where
        F: Fn(Arc<T>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ScenarioError>> + Send + 'static,
    {
        if self.scenarios.contains_key(name) {
            return Err(HarnessError::DuplicateScenario(name.to_string()));
        }

        let body: ScenarioBody<T> = Arc::new(
            move |transport: Arc<T>, cancel: CancellationToken| -> ScenarioFuture {
                Box::pin(body(transport, cancel))
            },
        );

        self.scenarios.insert(
            name,
            Scenario {
                name,
                description,
                body,
            },
        );
        Ok(())
    }

    /// Find a scenario by exact name
    pub fn lookup(&self, name: &str) -> Result<&Scenario<T>, HarnessError> {
        self.scenarios
            .get(name)
            .ok_or_else(|| HarnessError::UnknownScenario {
                name: name.to_string(),
                available: self.names().into_iter().map(str::to_string).collect(),
            })
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.scenarios.keys().copied().collect()
    }

    /// `(name, description)` pairs in sorted order
    pub fn describe(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.scenarios
            .values()
            .map(|scenario| (scenario.name, scenario.description))
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
