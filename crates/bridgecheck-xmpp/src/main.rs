//! bridgecheck-xmpp - run one XMPP conformance scenario
//!
//! Usage: `bridgecheck-xmpp <scenario-name> [timeout-seconds]`

use bridgecheck_core::{Harness, EXIT_FAILURE};
use bridgecheck_xmpp::registry;

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
