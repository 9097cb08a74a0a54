//! API scenarios

use std::sync::Arc;

use tracing::info;

use bridgecheck_core::{CancellationToken, HarnessError, ScenarioError, ScenarioRegistry};

use crate::client::ApiTransport;
use crate::message::ApiMessage;

/// Text of the message sent by `outgoing-message`
pub const OUTGOING_MESSAGE_TEXT: &str = "outgoing-message-test";

/// Post the canonical test message and expect the API to accept it
pub async fn outgoing_message(
    api: Arc<ApiTransport>,
    cancel: CancellationToken,
) -> Result<(), ScenarioError> {
    let message = ApiMessage::outgoing(OUTGOING_MESSAGE_TEXT);
    info!("Posting test message to {}", api.message_endpoint());

    tokio::select! {
        sent = api.send_message(&message) => sent.map_err(ScenarioError::transport),
        _ = cancel.cancelled() => Err(ScenarioError::Cancelled),
    }
}

/// All scenarios runnable against the API transport
pub fn registry() -> Result<ScenarioRegistry<ApiTransport>, HarnessError> {
    let mut registry = ScenarioRegistry::new();
    registry.register(
        "outgoing-message",
        "POST a test message to the bridge API and expect HTTP 200",
        outgoing_message,
    )?;
    Ok(registry)
}
