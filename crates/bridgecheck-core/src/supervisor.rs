//! Deadline Supervisor
//!
//! Races a running scenario against a wall-clock deadline. Exactly one
//! [`Outcome`] comes out: whichever of {scenario result, deadline} resolves
//! first. The loser is dropped; a late scenario result lands in a closed
//! channel and is discarded by the runner.

use tokio::sync::oneshot;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, warn};

use crate::outcome::{format_seconds, Outcome};
use crate::runner::RunningScenario;

/// Wait for `running` to report, giving up after `timeout`.
///
/// The deadline is measured from the moment the scenario was launched. A
/// result that is ready when the deadline fires still wins. On timeout the
/// scenario's cancellation token is fired and the task is left to wind down
/// on its own.
pub async fn supervise(scenario_name: &str, running: RunningScenario, timeout: Duration) -> Outcome {
    let RunningScenario {
        mut outcome_rx,
        cancel,
        started,
        ..
    } = running;

    // A limit past the end of the clock never fires.
    let Some(deadline) = started.checked_add(timeout) else {
        debug!(
            "Scenario {} deadline of {}s is beyond the clock range; waiting without one",
            scenario_name,
            format_seconds(timeout)
        );
        return reported(scenario_name, started, outcome_rx.await);
    };

    tokio::select! {
        biased;

        result = &mut outcome_rx => reported(scenario_name, started, result),

        _ = sleep_until(deadline) => {
            let elapsed = started.elapsed();
            warn!(
                "Scenario {} exceeded its {}s deadline; abandoning it",
                scenario_name,
                format_seconds(timeout)
            );
            cancel.cancel();
            Outcome::Timeout { limit: timeout, elapsed }
        }
    }
}

fn reported(
    scenario_name: &str,
    started: Instant,
    result: Result<Outcome, oneshot::error::RecvError>,
) -> Outcome {
    match result {
        Ok(outcome) => {
            debug!("Scenario {} reported after {:?}", scenario_name, started.elapsed());
            outcome
        }
        Err(_) => Outcome::Failure("scenario task stopped without reporting an outcome".to_string()),
    }
}
