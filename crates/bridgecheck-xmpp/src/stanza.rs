//! Parsed stanzas
//!
//! [`Element`] is a small owned XML tree built by the stream reader. Names are
//! local names; namespace declarations are kept as plain `xmlns` attributes,
//! which is all the harness needs to tell payloads apart.

use quick_xml::escape::escape;

pub const NS_CLIENT: &str = "jabber:client";
pub const NS_STREAM: &str = "http://etherx.jabber.org/streams";
pub const NS_SASL: &str = "urn:ietf:params:xml:ns:xmpp-sasl";
pub const NS_BIND: &str = "urn:ietf:params:xml:ns:xmpp-bind";
pub const NS_SESSION: &str = "urn:ietf:params:xml:ns:xmpp-session";
pub const NS_STANZAS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";
pub const NS_PING: &str = "urn:xmpp:ping";
pub const NS_MUC: &str = "http://jabber.org/protocol/muc";
pub const NS_MUC_USER: &str = "http://jabber.org/protocol/muc#user";
pub const NS_MUC_OWNER: &str = "http://jabber.org/protocol/muc#owner";
pub const NS_DATA: &str = "jabber:x:data";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn ns(&self) -> Option<&str> {
        self.attr("xmlns")
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_ns(&self, name: &str, ns: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.name == name && c.ns() == Some(ns))
    }

    /// Serialize with escaped attribute values and text
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() && self.text.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&escape(self.text.as_str()));
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

// ----------------------------------------------------------------------------
// Stanzas
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: Option<String>,
    pub kind: Option<String>,
    pub body: Option<String>,
}

impl Message {
    pub fn is_groupchat(&self) -> bool {
        self.kind.as_deref() == Some("groupchat")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub from: Option<String>,
    pub kind: Option<String>,
    pub element: Element,
}

impl Presence {
    pub fn is_error(&self) -> bool {
        self.kind.as_deref() == Some("error")
    }

    /// MUC status codes carried in the `muc#user` extension
    pub fn muc_status_codes(&self) -> Vec<u16> {
        self.element
            .child_ns("x", NS_MUC_USER)
            .map(|x| {
                x.children
                    .iter()
                    .filter(|c| c.name == "status")
                    .filter_map(|c| c.attr("code"))
                    .filter_map(|code| code.parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iq {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub from: Option<String>,
    pub element: Element,
}

impl Iq {
    pub fn is_ping(&self) -> bool {
        self.kind.as_deref() == Some("get") && self.element.child_ns("ping", NS_PING).is_some()
    }

    pub fn is_result(&self) -> bool {
        self.kind.as_deref() == Some("result")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stanza {
    Message(Message),
    Presence(Presence),
    Iq(Iq),
    Other(Element),
}

impl From<Element> for Stanza {
    fn from(element: Element) -> Self {
        let from = element.attr("from").map(str::to_string);
        let kind = element.attr("type").map(str::to_string);
        match element.name.as_str() {
            "message" => Stanza::Message(Message {
                from,
                kind,
                body: element.child("body").map(|b| b.text.clone()),
            }),
            "presence" => Stanza::Presence(Presence { from, kind, element }),
            "iq" => Stanza::Iq(Iq {
                id: element.attr("id").map(str::to_string),
                kind,
                from,
                element,
            }),
            _ => Stanza::Other(element),
        }
    }
}

/// Defined condition of an `<error/>` child, e.g. `forbidden`
pub fn error_condition(element: &Element) -> String {
    element
        .child("error")
        .and_then(|error| {
            error
                .children
                .iter()
                .find(|c| c.ns() == Some(NS_STANZAS))
                .or_else(|| error.children.first())
        })
        .map(|condition| condition.name.clone())
        .unwrap_or_else(|| "undefined-condition".to_string())
}
