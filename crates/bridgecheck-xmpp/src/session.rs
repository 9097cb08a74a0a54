//! Client session: stream negotiation, room join and stanza receive
//!
//! Negotiation follows the plaintext client path only:
//! stream header, SASL PLAIN, stream restart, resource binding, session
//! establishment when the server requires it, then initial presence.

use std::collections::VecDeque;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tracing::{debug, info, warn};

use crate::error::{Result, XmppError};
use crate::jid::Jid;
use crate::stanza::{
    error_condition, Element, Iq, Stanza, NS_BIND, NS_DATA, NS_MUC, NS_MUC_OWNER, NS_SASL,
    NS_SESSION,
};
use crate::stream::{stream_header, Frame, XmlReader, STREAM_CLOSE};

/// MUC status code for a room created by this join
const STATUS_ROOM_CREATED: u16 = 201;
/// MUC status code marking the occupant's own presence
const STATUS_SELF_PRESENCE: u16 = 110;

/// Account credentials used during negotiation
#[derive(Debug, Clone)]
pub struct Credentials {
    pub jid: Jid,
    pub password: String,
    pub resource: String,
}

/// Anything that yields inbound stanzas one at a time
#[async_trait]
pub trait StanzaSource: Send {
    async fn recv(&mut self) -> Result<Stanza>;
}

pub struct XmppSession<S> {
    reader: XmlReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    bound: Jid,
    pending: VecDeque<Stanza>,
    next_id: u64,
}

impl<S> XmppSession<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    /// Negotiate an authenticated, bound session over an established connection
    pub async fn negotiate(stream: S, credentials: &Credentials) -> Result<Self> {
        let (read, writer) = tokio::io::split(stream);
        let mut session = Self {
            reader: XmlReader::new(read),
            writer,
            bound: credentials.jid.with_resource(credentials.resource.clone()),
            pending: VecDeque::new(),
            next_id: 0,
        };

        let domain = credentials.jid.domain.clone();
        let features = session.open_stream(&domain).await?;
        session.authenticate(&features, credentials).await?;

        let features = session.open_stream(&domain).await?;
        session.bind(&features, &credentials.resource).await?;
        if requires_session(&features) {
            session.establish_session(&domain).await?;
        }

        session.send(&Element::new("presence")).await?;
        info!("Logged in as {}", session.bound);
        Ok(session)
    }

    /// Full JID assigned by the server
    pub fn bound_jid(&self) -> &Jid {
        &self.bound
    }

    /// Join `room` as `nick` without requesting history.
    ///
    /// Waits for the room to echo our own presence. A freshly created room is
    /// unlocked as an instant room. Stanzas that arrive meanwhile are kept for
    /// [`recv`](StanzaSource::recv).
    pub async fn join_room(&mut self, room: &Jid, nick: &str) -> Result<()> {
        let occupant = room.with_resource(nick).to_string();
        let join = Element::new("presence").with_attr("to", occupant.clone()).with_child(
            Element::new("x")
                .with_attr("xmlns", NS_MUC)
                .with_child(Element::new("history").with_attr("maxchars", "0")),
        );
        self.send(&join).await?;
        debug!("Joining {} as {}", room, nick);

        let mut buffered = VecDeque::new();
        let created = loop {
            let stanza = self.next_stanza().await?;
            if let Stanza::Presence(presence) = &stanza {
                if presence.from.as_deref() == Some(occupant.as_str()) {
                    if presence.is_error() {
                        return Err(XmppError::JoinFailed {
                            room: room.to_string(),
                            reason: error_condition(&presence.element),
                        });
                    }
                    let codes = presence.muc_status_codes();
                    if codes.is_empty() || codes.contains(&STATUS_SELF_PRESENCE) {
                        break codes.contains(&STATUS_ROOM_CREATED);
                    }
                }
            }
            buffered.push_back(stanza);
        };
        self.pending.extend(buffered);

        if created {
            info!("Room {} was created by this join; configuring as instant room", room);
            self.configure_instant_room(room).await?;
        }
        info!("Joined {} as {}", room, nick);
        Ok(())
    }

    /// End the stream and shut down the write half
    pub async fn close(&mut self) -> Result<()> {
        self.writer.write_all(STREAM_CLOSE.as_bytes()).await?;
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }

    pub async fn send(&mut self, element: &Element) -> Result<()> {
        self.send_raw(&element.to_xml()).await
    }

    async fn send_raw(&mut self, xml: &str) -> Result<()> {
        debug!("SEND {}", xml);
        self.writer.write_all(xml.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Negotiation steps
    // ------------------------------------------------------------------------

    /// Send a stream header and return the server's features
    async fn open_stream(&mut self, domain: &str) -> Result<Element> {
        self.send_raw(&stream_header(domain)).await?;

        match self.reader.read_frame().await? {
            Frame::StreamOpen(open) => debug!("Stream opened, id={:?}", open.attr("id")),
            other => {
                return Err(XmppError::Protocol(format!(
                    "expected stream header, got {:?}",
                    other
                )))
            }
        }

        match self.reader.read_frame().await? {
            Frame::Element(features) if features.name == "features" => Ok(features),
            Frame::StreamClose => Err(XmppError::StreamClosed),
            other => Err(XmppError::Protocol(format!(
                "expected stream features, got {:?}",
                other
            ))),
        }
    }

    async fn authenticate(&mut self, features: &Element, credentials: &Credentials) -> Result<()> {
        let offers_plain = features
            .child_ns("mechanisms", NS_SASL)
            .map(|m| {
                m.children
                    .iter()
                    .any(|c| c.name == "mechanism" && c.text == "PLAIN")
            })
            .unwrap_or(false);
        if !offers_plain {
            return Err(XmppError::AuthUnsupported);
        }

        let user = credentials.jid.local.as_deref().unwrap_or_default();
        let auth = Element::new("auth")
            .with_attr("xmlns", NS_SASL)
            .with_attr("mechanism", "PLAIN")
            .with_text(sasl_plain(user, &credentials.password));
        self.send(&auth).await?;

        match self.reader.read_frame().await? {
            Frame::Element(reply) if reply.name == "success" => {
                debug!("SASL PLAIN accepted");
                Ok(())
            }
            Frame::Element(reply) if reply.name == "failure" => Err(XmppError::AuthFailed(
                reply
                    .children
                    .iter()
                    .find(|c| c.name != "text")
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| "not-authorized".to_string()),
            )),
            Frame::StreamClose => Err(XmppError::StreamClosed),
            other => Err(XmppError::Protocol(format!(
                "unexpected SASL reply {:?}",
                other
            ))),
        }
    }

    async fn bind(&mut self, features: &Element, resource: &str) -> Result<()> {
        if features.child_ns("bind", NS_BIND).is_none() {
            return Err(XmppError::BindFailed(
                "server does not offer resource binding".to_string(),
            ));
        }

        let request = Element::new("bind")
            .with_attr("xmlns", NS_BIND)
            .with_child(Element::new("resource").with_text(resource));
        let reply = self.request("set", None, request).await?;
        if !reply.is_result() {
            return Err(XmppError::BindFailed(error_condition(&reply.element)));
        }

        let assigned = reply
            .element
            .child_ns("bind", NS_BIND)
            .and_then(|b| b.child("jid"))
            .map(|j| j.text.as_str());
        if let Some(assigned) = assigned {
            self.bound = assigned
                .parse()
                .map_err(|e| XmppError::BindFailed(format!("{}", e)))?;
        }
        Ok(())
    }

    async fn establish_session(&mut self, domain: &str) -> Result<()> {
        let reply = self
            .request("set", Some(domain), Element::new("session").with_attr("xmlns", NS_SESSION))
            .await?;
        if !reply.is_result() {
            return Err(XmppError::SessionFailed(error_condition(&reply.element)));
        }
        Ok(())
    }

    async fn configure_instant_room(&mut self, room: &Jid) -> Result<()> {
        let room_name = room.to_string();
        let query = Element::new("query").with_attr("xmlns", NS_MUC_OWNER).with_child(
            Element::new("x")
                .with_attr("xmlns", NS_DATA)
                .with_attr("type", "submit"),
        );
        let reply = self.request("set", Some(&room_name), query).await?;
        if !reply.is_result() {
            return Err(XmppError::RoomConfigFailed {
                room: room_name,
                reason: error_condition(&reply.element),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Stanza plumbing
    // ------------------------------------------------------------------------

    /// Send an IQ and wait for the matching reply, queueing anything else
    async fn request(&mut self, kind: &str, to: Option<&str>, payload: Element) -> Result<Iq> {
        self.next_id += 1;
        let id = format!("bc{}", self.next_id);

        let mut iq = Element::new("iq").with_attr("type", kind).with_attr("id", id.clone());
        if let Some(to) = to {
            iq = iq.with_attr("to", to);
        }
        self.send(&iq.with_child(payload)).await?;

        loop {
            match self.next_stanza().await? {
                Stanza::Iq(reply)
                    if reply.id.as_deref() == Some(id.as_str())
                        && matches!(reply.kind.as_deref(), Some("result") | Some("error")) =>
                {
                    return Ok(reply)
                }
                other => self.pending.push_back(other),
            }
        }
    }

    /// Next stanza off the wire, answering server pings along the way
    async fn next_stanza(&mut self) -> Result<Stanza> {
        loop {
            let element = match self.reader.read_frame().await? {
                Frame::Element(element) => element,
                Frame::StreamClose => return Err(XmppError::StreamClosed),
                Frame::StreamOpen(_) => {
                    return Err(XmppError::Protocol("unexpected stream restart".to_string()))
                }
            };

            if element.name == "error" {
                let condition = element
                    .children
                    .first()
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| "undefined-condition".to_string());
                warn!("Stream error from server: {}", condition);
                return Err(XmppError::Protocol(format!("stream error: {}", condition)));
            }

            match Stanza::from(element) {
                Stanza::Iq(iq) if iq.is_ping() => self.answer_ping(&iq).await?,
                stanza => return Ok(stanza),
            }
        }
    }

    async fn answer_ping(&mut self, ping: &Iq) -> Result<()> {
        debug!("Answering ping {:?} from {:?}", ping.id, ping.from);
        let mut pong = Element::new("iq").with_attr("type", "result");
        if let Some(id) = &ping.id {
            pong = pong.with_attr("id", id.clone());
        }
        if let Some(from) = &ping.from {
            pong = pong.with_attr("to", from.clone());
        }
        self.send(&pong).await
    }
}

#[async_trait]
impl<S> StanzaSource for XmppSession<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    async fn recv(&mut self) -> Result<Stanza> {
        if let Some(stanza) = self.pending.pop_front() {
            return Ok(stanza);
        }
        self.next_stanza().await
    }
}

/// Session establishment is needed when advertised and not marked optional
fn requires_session(features: &Element) -> bool {
    features
        .child_ns("session", NS_SESSION)
        .map(|s| s.child("optional").is_none())
        .unwrap_or(false)
}

/// SASL PLAIN initial response: `\0user\0password`, base64-encoded
pub fn sasl_plain(user: &str, password: &str) -> String {
    STANDARD.encode(format!("\0{}\0{}", user, password))
}
