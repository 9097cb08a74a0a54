//! Scenario outcomes and the reporter that turns them into output and exit codes

use std::time::Duration;

use crate::error::ScenarioError;

/// Process exit code for a passing scenario
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code for every other path (failure, timeout, configuration and setup errors)
pub const EXIT_FAILURE: i32 = 1;

// ----------------------------------------------------------------------------
// Outcome
// ----------------------------------------------------------------------------

/// Result of exactly one scenario invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The scenario body returned success before the deadline.
    Success,
    /// The scenario body returned an error before the deadline.
    Failure(String),
    /// The deadline fired first. `elapsed` is measured from scenario launch.
    Timeout { limit: Duration, elapsed: Duration },
}

impl Outcome {
    /// Wrap a scenario body's return value
    pub fn from_result(result: Result<(), ScenarioError>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(err) => Outcome::Failure(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Outcome::Timeout { .. })
    }

    /// Exit code the process should terminate with
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }

    /// The single diagnostic line describing this outcome
    pub fn summary(&self, scenario: &str) -> String {
        match self {
            Outcome::Success => format!("OK: Scenario {}", scenario),
            Outcome::Failure(reason) => format!(
                "ERROR: Scenario {} failed because of error:\n{}",
                scenario, reason
            ),
            Outcome::Timeout { limit, .. } => format!(
                "ERROR: Scenario {} timeout after {} seconds",
                scenario,
                format_seconds(*limit)
            ),
        }
    }
}

/// Print the outcome summary and return the matching exit code
pub fn report(scenario: &str, outcome: &Outcome) -> i32 {
    println!("{}", outcome.summary(scenario));
    outcome.exit_code()
}

/// Render a duration the way the CLI accepts it: whole seconds when exact.
pub fn format_seconds(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.3}", duration.as_secs_f64())
    }
}
