//! Harness driver
//!
//! Wires argument parsing, configuration, registry lookup, transport setup,
//! the runner and the deadline supervisor into a single invocation. Every
//! path ends in exactly one diagnostic line on stdout and one exit code.

use std::ffi::OsString;
use std::sync::Arc;

use clap::{error::ErrorKind, Parser};
use tracing::{debug, info, warn};

use crate::cli::{Cli, Invocation};
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::logging::setup_logging;
use crate::outcome::{format_seconds, report, Outcome, EXIT_FAILURE, EXIT_SUCCESS};
use crate::registry::ScenarioRegistry;
use crate::runner;
use crate::supervisor::supervise;
use crate::transport::Transport;

/// Conformance harness for one transport
pub struct Harness<T: Transport> {
    registry: ScenarioRegistry<T>,
}

impl<T: Transport> Harness<T> {
    pub fn new(registry: ScenarioRegistry<T>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ScenarioRegistry<T> {
        &self.registry
    }

    /// Run with the process arguments and exit with the resulting code
    pub async fn main(self) -> ! {
        let code = self.run_from_args(std::env::args_os()).await;
        std::process::exit(code)
    }

    /// Run one invocation described by `args` (including the program name)
    /// and return the process exit code
    pub async fn run_from_args<I, A>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(err) => {
                let code = match err.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                    _ => EXIT_FAILURE,
                };
                let _ = err.print();
                return code;
            }
        };

        setup_logging(cli.verbose);

        if cli.list {
            self.list_scenarios();
            return EXIT_SUCCESS;
        }

        let config = match self.load_config(&cli) {
            Ok(config) => config,
            Err(err) => return fatal(err),
        };

        let invocation = match cli.invocation(config.default_timeout()) {
            Ok(invocation) => invocation,
            Err(err) => return fatal(err),
        };

        match self.execute(&invocation, &config).await {
            Ok(outcome) => outcome.exit_code(),
            Err(err) => fatal(err),
        }
    }

    /// Look up, connect, run and supervise one scenario.
    ///
    /// The scenario name is resolved before the transport is touched, so an
    /// unknown name never opens a session. The outcome line is printed before
    /// the transport is torn down.
    pub async fn execute(
        &self,
        invocation: &Invocation,
        config: &HarnessConfig<T::Config>,
    ) -> Result<Outcome, HarnessError> {
        let scenario = self.registry.lookup(&invocation.scenario)?;

        println!("{}", T::INIT_NOTICE);
        let transport = T::connect(&config.transport)
            .await
            .map_err(|e| HarnessError::TransportSetup(Box::new(e)))?;
        let transport = Arc::new(transport);

        println!(
            "Running scenario {} (timeout={}s)",
            invocation.scenario,
            format_seconds(invocation.timeout)
        );
        info!("Running scenario: {}", scenario.name());

        let running = runner::run(scenario.name(), scenario.bind(Arc::clone(&transport)));
        let outcome = supervise(scenario.name(), running, invocation.timeout).await;
        report(scenario.name(), &outcome);

        match tokio::time::timeout(config.shutdown_grace(), transport.shutdown()).await {
            Ok(Ok(())) => debug!("Transport shut down"),
            Ok(Err(e)) => warn!("Transport shutdown failed: {}", e),
            Err(_) => warn!(
                "Transport shutdown exceeded {}s grace period",
                format_seconds(config.shutdown_grace())
            ),
        }

        Ok(outcome)
    }

    fn load_config(&self, cli: &Cli) -> Result<HarnessConfig<T::Config>, HarnessError> {
        match &cli.config {
            Some(path) => info!("Loading configuration from: {}", path.display()),
            None => debug!("Using default configuration"),
        }

        let config = HarnessConfig::<T::Config>::load(cli.config.as_deref())?;
        T::validate_config(&config.transport)?;
        Ok(config)
    }

    fn list_scenarios(&self) {
        println!("Available test scenarios:");
        for (name, description) in self.registry.describe() {
            println!("  {:<24} - {}", name, description);
        }
    }
}

fn fatal(err: HarnessError) -> i32 {
    debug!("Fatal: {:?}", err);
    println!("ERROR: {}", err);
    EXIT_FAILURE
}
