//! Command-line interface definitions and parsing

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::HarnessError;

/// Run one conformance scenario against a live bridge deployment
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the scenario to run
    #[arg(required_unless_present = "list")]
    pub scenario: Option<String>,

    /// Deadline in whole seconds (defaults to harness.default_timeout_secs)
    pub timeout: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// List available scenarios and exit
    #[arg(long)]
    pub list: bool,
}

/// A validated request to run one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub scenario: String,
    pub timeout: Duration,
}

impl Cli {
    /// Resolve the scenario name and deadline, falling back to `default_timeout`
    pub fn invocation(&self, default_timeout: Duration) -> Result<Invocation, HarnessError> {
        let scenario = self
            .scenario
            .clone()
            .ok_or_else(|| HarnessError::Arguments("missing scenario name".to_string()))?;
        let timeout = parse_timeout(self.timeout.as_deref(), default_timeout)?;
        Ok(Invocation { scenario, timeout })
    }
}

/// Parse the optional positional timeout argument
pub fn parse_timeout(raw: Option<&str>, default_timeout: Duration) -> Result<Duration, HarnessError> {
    match raw {
        None => Ok(default_timeout),
        Some(value) => value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| HarnessError::InvalidTimeout(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Duration = Duration::from_secs(5);

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("bridgecheck").chain(args.iter().copied());
        Cli::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn test_timeout_defaults_to_five_seconds() {
        let invocation = parse(&["outgoing-message"]).invocation(DEFAULT).unwrap();
        assert_eq!(invocation.scenario, "outgoing-message");
        assert_eq!(invocation.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_timeout() {
        let invocation = parse(&["outgoing-message", "10"]).invocation(DEFAULT).unwrap();
        assert_eq!(invocation.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_unparsable_timeout_rejected() {
        let err = parse(&["outgoing-message", "abc"]).invocation(DEFAULT).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidTimeout(ref raw) if raw == "abc"));
        assert_eq!(err.to_string(), "Invalid timeout: abc");
    }

    #[test]
    fn test_negative_timeout_rejected() {
        let cli = Cli::try_parse_from(["bridgecheck", "outgoing-message", "--", "-3"]).unwrap();
        assert!(cli.invocation(DEFAULT).is_err());
    }

    #[test]
    fn test_list_needs_no_scenario() {
        let cli = parse(&["--list"]);
        assert!(cli.list);
        assert!(cli.scenario.is_none());
    }

    #[test]
    fn test_scenario_required_without_list() {
        assert!(Cli::try_parse_from(["bridgecheck"]).is_err());
    }

    #[test]
    fn test_options() {
        let cli = parse(&["-v", "--config", "bridge.toml", "outgoing-message"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("bridge.toml")));
    }
}
