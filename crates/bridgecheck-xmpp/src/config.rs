//! XMPP transport configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use bridgecheck_core::ConfigError;

use crate::jid::Jid;

/// Settings for the XMPP client and the room it watches, read from the `[transport]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmppConfig {
    /// `host:port` of the server's client listener (plaintext)
    pub address: String,

    /// Account to authenticate as
    pub jid: String,
    pub password: String,

    /// Resource requested at bind time
    pub resource: String,

    /// Multi-user chat room (bare JID) to join
    pub room: String,

    /// Nickname used in the room
    pub nick: String,

    /// Full JID the bridged message must come from
    pub expected_sender: String,

    /// Exact body the bridged message must carry
    pub expected_body: String,

    /// Upper bound on connect, login and room join
    pub connect_timeout_secs: u64,
}

impl Default for XmppConfig {
    fn default() -> Self {
        Self {
            address: "localhost:52222".to_string(),
            jid: "client-xmpp@matterbridge-test.localhost".to_string(),
            password: "testxmpp_password".to_string(),
            resource: "bridgecheck".to_string(),
            room: "test@muc.matterbridge-test.localhost".to_string(),
            nick: "client-xmpp".to_string(),
            expected_sender: "test@muc.matterbridge-test.localhost/matterbridge-xmpp".to_string(),
            expected_body: "<apitest> outgoing-message-test".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl XmppConfig {
    pub fn account(&self) -> Result<Jid, ConfigError> {
        let jid = parse_jid("transport.jid", &self.jid)?;
        if jid.local.is_none() {
            return Err(ConfigError::Validation(format!(
                "transport.jid must include a local part, got {}",
                self.jid
            )));
        }
        Ok(jid.bare())
    }

    pub fn room_jid(&self) -> Result<Jid, ConfigError> {
        let room = parse_jid("transport.room", &self.room)?;
        if room.local.is_none() || room.resource.is_some() {
            return Err(ConfigError::Validation(format!(
                "transport.room must be a bare room@service JID, got {}",
                self.room
            )));
        }
        Ok(room)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "transport.address must not be empty".to_string(),
            ));
        }
        self.account()?;
        self.room_jid()?;
        if self.resource.is_empty() {
            return Err(ConfigError::Validation(
                "transport.resource must not be empty".to_string(),
            ));
        }
        if self.nick.is_empty() {
            return Err(ConfigError::Validation(
                "transport.nick must not be empty".to_string(),
            ));
        }
        parse_jid("transport.expected_sender", &self.expected_sender)?;
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "transport.connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_jid(key: &str, value: &str) -> Result<Jid, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::Validation(format!("{}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = XmppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.account().unwrap().domain, "matterbridge-test.localhost");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_domain_only_account() {
        let config = XmppConfig {
            jid: "matterbridge-test.localhost".to_string(),
            ..XmppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_room_with_nick() {
        let config = XmppConfig {
            room: "test@muc.example/nick".to_string(),
            ..XmppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_values() {
        let empty_nick = XmppConfig {
            nick: String::new(),
            ..XmppConfig::default()
        };
        assert!(empty_nick.validate().is_err());

        let zero_timeout = XmppConfig {
            connect_timeout_secs: 0,
            ..XmppConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }
}
