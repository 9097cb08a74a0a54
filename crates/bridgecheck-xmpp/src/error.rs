//! XMPP adapter errors

use std::time::Duration;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

use bridgecheck_core::ConfigError;

#[derive(Error, Debug)]
pub enum XmppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("XMPP connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML from server: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML attribute from server: {0}")]
    Attribute(#[from] AttrError),

    #[error("XMPP stream closed by server")]
    StreamClosed,

    #[error("Unexpected XMPP stream content: {0}")]
    Protocol(String),

    #[error("Server does not offer SASL PLAIN authentication")]
    AuthUnsupported,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Resource binding failed: {0}")]
    BindFailed(String),

    #[error("Session establishment failed: {0}")]
    SessionFailed(String),

    #[error("Could not join room {room}: {reason}")]
    JoinFailed { room: String, reason: String },

    #[error("Could not configure room {room}: {reason}")]
    RoomConfigFailed { room: String, reason: String },

    #[error("Timed out after {}s establishing the XMPP session", .0.as_secs())]
    ConnectTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, XmppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_failure_names_room() {
        let err = XmppError::JoinFailed {
            room: "test@muc.example".to_string(),
            reason: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "Could not join room test@muc.example: forbidden");
    }

    #[test]
    fn test_connect_timeout_message() {
        let err = XmppError::ConnectTimeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Timed out after 10s establishing the XMPP session");
    }
}
