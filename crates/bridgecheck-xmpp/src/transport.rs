//! XMPP transport: one logged-in session joined to the test room

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info};

use bridgecheck_core::{ConfigError, Transport};

use crate::config::XmppConfig;
use crate::error::{Result, XmppError};
use crate::session::{Credentials, XmppSession};
use crate::stanza::Message;

/// The message the bridge is expected to relay into the room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedMessage {
    pub sender: String,
    pub body: String,
}

impl ExpectedMessage {
    /// Exact match on type, sender and body
    pub fn matches(&self, message: &Message) -> bool {
        message.is_groupchat()
            && message.from.as_deref() == Some(self.sender.as_str())
            && message.body.as_deref() == Some(self.body.as_str())
    }
}

pub struct XmppTransport {
    session: Mutex<XmppSession<TcpStream>>,
    expected: ExpectedMessage,
}

impl XmppTransport {
    async fn open(config: &XmppConfig) -> Result<XmppSession<TcpStream>> {
        let credentials = Credentials {
            jid: config.account()?,
            password: config.password.clone(),
            resource: config.resource.clone(),
        };

        debug!("Connecting to {}", config.address);
        let stream = TcpStream::connect(&config.address).await?;
        stream.set_nodelay(true)?;

        let mut session = XmppSession::negotiate(stream, &credentials).await?;
        session.join_room(&config.room_jid()?, &config.nick).await?;
        Ok(session)
    }

    /// Exclusive access to the session; held by at most one of scenario or shutdown
    pub fn session(&self) -> &Mutex<XmppSession<TcpStream>> {
        &self.session
    }

    pub fn expected(&self) -> &ExpectedMessage {
        &self.expected
    }
}

#[async_trait]
impl Transport for XmppTransport {
    type Config = XmppConfig;
    type Error = XmppError;

    const INIT_NOTICE: &'static str = "Initializing client";

    fn validate_config(config: &Self::Config) -> std::result::Result<(), ConfigError> {
        config.validate()
    }

    /// Connect, log in and join the configured room, bounded by `connect_timeout_secs`
    async fn connect(config: &Self::Config) -> Result<Self> {
        config.validate()?;
        let limit = config.connect_timeout();
        let session = tokio::time::timeout(limit, Self::open(config))
            .await
            .map_err(|_| XmppError::ConnectTimeout(limit))??;

        Ok(Self {
            session: Mutex::new(session),
            expected: ExpectedMessage {
                sender: config.expected_sender.clone(),
                body: config.expected_body.clone(),
            },
        })
    }

    async fn shutdown(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        session.close().await?;
        info!("XMPP stream closed");
        Ok(())
    }
}
