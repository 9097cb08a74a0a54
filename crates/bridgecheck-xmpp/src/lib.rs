//! bridgecheck XMPP transport
//!
//! A minimal plaintext XMPP client: enough to log in, join the test room and
//! watch what the bridge relays into it.

pub mod config;
pub mod error;
pub mod jid;
pub mod scenarios;
pub mod session;
pub mod stanza;
pub mod stream;
pub mod transport;

pub use config::XmppConfig;
pub use error::{Result, XmppError};
pub use jid::Jid;
pub use scenarios::registry;
pub use session::{Credentials, StanzaSource, XmppSession};
pub use stanza::{Element, Stanza};
pub use transport::{ExpectedMessage, XmppTransport};
