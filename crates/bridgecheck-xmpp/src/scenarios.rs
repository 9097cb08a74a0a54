//! XMPP scenarios

use std::sync::Arc;

use tracing::{debug, info};

use bridgecheck_core::{CancellationToken, HarnessError, ScenarioError, ScenarioRegistry};

use crate::session::StanzaSource;
use crate::stanza::Stanza;
use crate::transport::{ExpectedMessage, XmppTransport};

/// Receive stanzas until the expected room message shows up.
///
/// Returns on the first match, on a receive error, or when `cancel` fires.
pub async fn wait_for_message<S>(
    source: &mut S,
    expected: &ExpectedMessage,
    cancel: &CancellationToken,
) -> Result<(), ScenarioError>
where
    S: StanzaSource + ?Sized,
{
    loop {
        let stanza = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScenarioError::Cancelled),
            received = source.recv() => received.map_err(ScenarioError::transport)?,
        };

        match stanza {
            Stanza::Message(message) if expected.matches(&message) => {
                debug!("Expected message received from {}", expected.sender);
                return Ok(());
            }
            Stanza::Message(message) => {
                info!(
                    "Received MUC message from {}:\n{}",
                    message.from.as_deref().unwrap_or("<unknown>"),
                    message.body.as_deref().unwrap_or_default()
                );
            }
            other => debug!("Ignoring {:?}", other),
        }
    }
}

/// Wait for the bridge to relay the API test message into the room
pub async fn outgoing_message(
    xmpp: Arc<XmppTransport>,
    cancel: CancellationToken,
) -> Result<(), ScenarioError> {
    let mut session = tokio::select! {
        session = xmpp.session().lock() => session,
        _ = cancel.cancelled() => return Err(ScenarioError::Cancelled),
    };
    wait_for_message(&mut *session, xmpp.expected(), &cancel).await
}

/// All scenarios runnable against the XMPP transport
pub fn registry() -> Result<ScenarioRegistry<XmppTransport>, HarnessError> {
    let mut registry = ScenarioRegistry::new();
    registry.register(
        "outgoing-message",
        "Wait for the bridged API test message to appear in the XMPP room",
        outgoing_message,
    )?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::{Result as XmppResult, XmppError};
    use crate::stanza::Message;

    /// Replays a fixed list of stanzas, then either fails or waits forever
    struct Scripted {
        stanzas: VecDeque<Stanza>,
        fail_when_empty: bool,
    }

    #[async_trait]
    impl StanzaSource for Scripted {
        async fn recv(&mut self) -> XmppResult<Stanza> {
            match self.stanzas.pop_front() {
                Some(stanza) => Ok(stanza),
                None if self.fail_when_empty => Err(XmppError::StreamClosed),
                None => std::future::pending().await,
            }
        }
    }

    fn expected() -> ExpectedMessage {
        ExpectedMessage {
            sender: "test@muc.matterbridge-test.localhost/matterbridge-xmpp".to_string(),
            body: "<apitest> outgoing-message-test".to_string(),
        }
    }

    fn message(kind: &str, from: &str, body: &str) -> Stanza {
        Stanza::Message(Message {
            from: Some(from.to_string()),
            kind: Some(kind.to_string()),
            body: Some(body.to_string()),
        })
    }

    #[tokio::test]
    async fn test_matching_message_succeeds_after_noise() {
        let expected = expected();
        let mut source = Scripted {
            stanzas: VecDeque::from(vec![
                message("groupchat", "test@muc.matterbridge-test.localhost/someone", "hello"),
                message("chat", &expected.sender, &expected.body),
                message("groupchat", &expected.sender, &expected.body),
            ]),
            fail_when_empty: true,
        };

        let result = wait_for_message(&mut source, &expected, &CancellationToken::new()).await;
        assert!(result.is_ok());
        assert!(source.stanzas.is_empty());
    }

    #[tokio::test]
    async fn test_receive_error_fails() {
        let mut source = Scripted {
            stanzas: VecDeque::new(),
            fail_when_empty: true,
        };
        let err = wait_for_message(&mut source, &expected(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "XMPP stream closed by server");
    }

    #[tokio::test]
    async fn test_near_miss_keeps_waiting_until_cancelled() {
        let expected = expected();
        let mut source = Scripted {
            stanzas: VecDeque::from(vec![message(
                "groupchat",
                &expected.sender,
                "<apitest> outgoing-message-test ",
            )]),
            fail_when_empty: false,
        };

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = wait_for_message(&mut source, &expected, &cancel).await.unwrap_err();
        assert!(matches!(err, ScenarioError::Cancelled));
    }

    #[test]
    fn test_registry_contents() {
        let registry = registry().unwrap();
        assert_eq!(registry.names(), vec!["outgoing-message"]);
    }
}
