//! Incremental XML stream reader
//!
//! An XMPP stream is one long document: `<stream:stream>` opens it, each
//! top-level child is a stanza, and `</stream:stream>` closes it. The reader
//! turns quick-xml events into one [`Frame`] at a time.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tokio::io::{AsyncRead, BufReader};

use crate::error::{Result, XmppError};
use crate::stanza::{Element, NS_CLIENT, NS_STREAM};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `<stream:stream ...>`; children are always empty
    StreamOpen(Element),
    /// A complete top-level element (stanza, features, SASL reply)
    Element(Element),
    /// `</stream:stream>`
    StreamClose,
}

pub struct XmlReader<R> {
    reader: Reader<BufReader<R>>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> XmlReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: Reader::from_reader(BufReader::new(inner)),
            buf: Vec::new(),
        }
    }

    /// Read until the next complete frame.
    ///
    /// Not cancellation safe: a frame that is half-read when the future is
    /// dropped is lost.
    pub async fn read_frame(&mut self) -> Result<Frame> {
        let mut stack: Vec<Element> = Vec::new();

        loop {
            self.buf.clear();
            let event = self.reader.read_event_into_async(&mut self.buf).await?;

            match event {
                Event::Start(start) => {
                    let element = element_from(&start)?;
                    if stack.is_empty() && element.name == "stream" {
                        return Ok(Frame::StreamOpen(element));
                    }
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(Frame::Element(element)),
                    }
                }
                Event::End(_) => match stack.pop() {
                    Some(element) => match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(Frame::Element(element)),
                    },
                    None => return Ok(Frame::StreamClose),
                },
                // Text between stanzas is keep-alive whitespace; text inside an element is kept verbatim.
                Event::Text(text) => {
                    if let Some(element) = stack.last_mut() {
                        element.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(element) = stack.last_mut() {
                        element.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => return Err(XmppError::StreamClosed),
                _ => {}
            }
        }
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.local_name().as_ref()));
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

/// Client stream header addressed to `domain`
pub fn stream_header(domain: &str) -> String {
    format!(
        "<?xml version='1.0'?><stream:stream to=\"{}\" version=\"1.0\" xmlns=\"{}\" xmlns:stream=\"{}\">",
        quick_xml::escape::escape(domain),
        NS_CLIENT,
        NS_STREAM
    )
}

pub const STREAM_CLOSE: &str = "</stream:stream>";
