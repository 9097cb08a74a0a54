//! Jabber identifiers (`local@domain/resource`)

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jid {
    pub local: Option<String>,
    pub domain: String,
    pub resource: Option<String>,
}

impl Jid {
    /// The JID without its resource
    pub fn bare(&self) -> Jid {
        Jid {
            resource: None,
            ..self.clone()
        }
    }

    pub fn with_resource(&self, resource: impl Into<String>) -> Jid {
        Jid {
            resource: Some(resource.into()),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid JID {input:?}: {reason}")]
pub struct JidError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| JidError {
            input: input.to_string(),
            reason,
        };

        let (address, resource) = match input.split_once('/') {
            Some((address, resource)) => {
                if resource.is_empty() {
                    return Err(invalid("empty resource"));
                }
                (address, Some(resource.to_string()))
            }
            None => (input, None),
        };

        let (local, domain) = match address.split_once('@') {
            Some((local, domain)) => {
                if local.is_empty() {
                    return Err(invalid("empty local part"));
                }
                (Some(local.to_string()), domain)
            }
            None => (None, address),
        };

        if domain.is_empty() {
            return Err(invalid("empty domain"));
        }
        if domain.contains('@') {
            return Err(invalid("more than one '@'"));
        }

        Ok(Jid {
            local,
            domain: domain.to_string(),
            resource,
        })
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(local) = &self.local {
            write!(f, "{}@", local)?;
        }
        f.write_str(&self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{}", resource)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_jid() {
        let jid: Jid = "test@muc.matterbridge-test.localhost/matterbridge-xmpp".parse().unwrap();
        assert_eq!(jid.local.as_deref(), Some("test"));
        assert_eq!(jid.domain, "muc.matterbridge-test.localhost");
        assert_eq!(jid.resource.as_deref(), Some("matterbridge-xmpp"));
        assert_eq!(jid.bare().to_string(), "test@muc.matterbridge-test.localhost");
    }

    #[test]
    fn test_resource_may_contain_slashes() {
        let jid: Jid = "room@muc.example/nick/with/slashes".parse().unwrap();
        assert_eq!(jid.resource.as_deref(), Some("nick/with/slashes"));
    }

    #[test]
    fn test_domain_only() {
        let jid: Jid = "matterbridge-test.localhost".parse().unwrap();
        assert_eq!(jid.local, None);
        assert_eq!(jid.to_string(), "matterbridge-test.localhost");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("@example.com".parse::<Jid>().is_err());
        assert!("user@".parse::<Jid>().is_err());
        assert!("user@example.com/".parse::<Jid>().is_err());
        assert!("a@b@c".parse::<Jid>().is_err());
    }
}
