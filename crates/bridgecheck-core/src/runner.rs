//! Scenario Runner
//!
//! Launches a bound scenario on its own tokio task. The task reports through a
//! oneshot channel that carries exactly one [`Outcome`]. The task is never
//! aborted from the outside; the supervisor only fires its cancellation token.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ScenarioError;
use crate::outcome::Outcome;
use crate::registry::ScenarioFn;

/// Handle to a scenario executing on its own task
#[derive(Debug)]
pub struct RunningScenario {
    pub(crate) outcome_rx: oneshot::Receiver<Outcome>,
    pub(crate) cancel: CancellationToken,
    pub(crate) started: Instant,
    task: JoinHandle<()>,
}

impl RunningScenario {
    /// When the scenario task was launched
    pub fn started_at(&self) -> Instant {
        self.started
    }

    /// Token the scenario body observes for cooperative cancellation
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the scenario task has returned
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Launch `scenario` on an independent task
pub fn run(scenario_name: &str, scenario: ScenarioFn) -> RunningScenario {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let cancel = CancellationToken::new();
    let body = scenario(cancel.clone());
    let name = scenario_name.to_string();
    let started = Instant::now();

    let task = tokio::spawn(async move {
        let outcome = match AssertUnwindSafe(body).catch_unwind().await {
            Ok(result) => Outcome::from_result(result),
            Err(panic) => Outcome::from_result(Err(ScenarioError::Panicked(panic_message(panic)))),
        };

        debug!("Scenario {} finished: {:?}", name, outcome);
        if outcome_tx.send(outcome).is_err() {
            debug!("Scenario {} finished after the supervisor stopped waiting", name);
        }
    });

    RunningScenario {
        outcome_rx,
        cancel,
        started,
        task,
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
