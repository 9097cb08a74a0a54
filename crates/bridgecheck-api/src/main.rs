//! bridgecheck-api - run one API conformance scenario
//!
//! Usage: `bridgecheck-api <scenario-name> [timeout-seconds]`

use bridgecheck_api::registry;
use bridgecheck_core::{Harness, EXIT_FAILURE};

#[tokio::main]
async fn main() {
    let registry = match registry() {
        Ok(registry) => registry,
        Err(e) => {
            println!("ERROR: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    Harness::new(registry).main().await
}
