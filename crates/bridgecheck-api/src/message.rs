//! API message payload
//!
//! Mirrors the JSON document the bridge's REST API accepts on `POST /message`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Channel every canonical test message is addressed to
pub const TEST_CHANNEL: &str = "testchannel";
/// Username the API gateway relays test messages as
pub const TEST_USERNAME: &str = "apitest";
pub const TEST_USER_ID: &str = "apitest_id";
pub const TEST_ACCOUNT: &str = "api.test";
pub const TEST_PROTOCOL: &str = "api";
pub const TEST_GATEWAY: &str = "test";
/// Fixed timestamp so bridge-side output is reproducible
pub const TEST_TIMESTAMP: &str = "2019-01-09T22:53:51.618575236+01:00";

/// A message as exchanged with the bridge API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub text: String,
    pub channel: String,
    pub username: String,
    #[serde(rename = "userid")]
    pub user_id: String,
    pub avatar: String,
    pub account: String,
    pub event: String,
    pub protocol: String,
    pub gateway: String,
    pub parent_id: String,
    pub timestamp: String,
    pub id: String,
    pub extra: Option<HashMap<String, Vec<serde_json::Value>>>,
}

impl ApiMessage {
    /// The canonical test message carrying `text`
    pub fn outgoing(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            channel: TEST_CHANNEL.to_string(),
            username: TEST_USERNAME.to_string(),
            user_id: TEST_USER_ID.to_string(),
            account: TEST_ACCOUNT.to_string(),
            protocol: TEST_PROTOCOL.to_string(),
            gateway: TEST_GATEWAY.to_string(),
            timestamp: TEST_TIMESTAMP.to_string(),
            ..Default::default()
        }
    }
}
