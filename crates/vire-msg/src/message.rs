//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Envelope assembly.
//!
//! A [`Message`] only ever holds a header and a body that were valid when
//! attached. [`MessageBuilder`] performs the same gating and seals the
//! result once both parts are present.
use std::fmt;

use tracing::warn;

use crate::body::MessageBody;
use crate::dump::{self, TreeDump};
use crate::header::MessageHeader;
use crate::payload::Payload;
use crate::{EnvelopeError, Result, TypeIdentified};

/// Header plus body forming one transmissible unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    header: MessageHeader,
    body: MessageBody,
}

fn check_header(header: &MessageHeader) -> Result<()> {
    if header.is_valid() {
        Ok(())
    } else {
        warn!(message_id = %header.message_id(), "rejecting invalid message header");
        Err(EnvelopeError::InvalidHeader)
    }
}

fn check_body(body: &MessageBody) -> Result<()> {
    if body.is_valid() {
        Ok(())
    } else {
        warn!(payload_type = %body.payload_type_id(), "rejecting invalid message body");
        Err(EnvelopeError::InvalidBody)
    }
}

impl Message {
    /// Start assembling a message.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// Attached header (empty until one is set).
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Attach `header` if it is valid; otherwise nothing changes.
    pub fn set_header(&mut self, header: MessageHeader) -> Result<()> {
        check_header(&header)?;
        self.header = header;
        Ok(())
    }

    /// Attached body (empty until one is set).
    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Attach `body` if it is valid; otherwise nothing changes.
    pub fn set_body(&mut self, body: MessageBody) -> Result<()> {
        check_body(&body)?;
        self.body = body;
        Ok(())
    }

    /// Payload carried by the body.
    pub fn payload(&self) -> Option<&Payload> {
        self.body.payload()
    }

    /// Both parts attached and valid.
    pub fn is_valid(&self) -> bool {
        self.header.is_valid() && self.body.is_valid()
    }

    /// Back to an empty message.
    pub fn reset(&mut self) {
        self.header.reset();
        self.body.reset();
    }

    /// Split into header and body.
    pub fn into_parts(self) -> (MessageHeader, MessageBody) {
        (self.header, self.body)
    }
}

impl TypeIdentified for Message {
    const TYPE_ID: &'static str = "vire::message::message";
    const WIRE_TYPE_ID: &'static str = "vire.message.Message";
}

impl TreeDump for Message {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        writeln!(out, "{indent}{}Header :", dump::TAG)?;
        self.header
            .tree_dump(out, "", &format!("{indent}{}", dump::SKIP_TAG), false)?;
        writeln!(out, "{indent}{}Body :", dump::TAG)?;
        self.body
            .tree_dump(out, "", &format!("{indent}{}", dump::SKIP_TAG), false)?;
        writeln!(
            out,
            "{indent}{}Validity : {}",
            dump::inherit_tag(inherit),
            self.is_valid()
        )
    }
}

/// Accumulates a validated header and body, then seals a [`Message`].
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    header: Option<MessageHeader>,
    body: Option<MessageBody>,
}

impl MessageBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `header` if it is valid.
    pub fn header(mut self, header: MessageHeader) -> Result<Self> {
        check_header(&header)?;
        self.header = Some(header);
        Ok(self)
    }

    /// Accept `body` if it is valid.
    pub fn body(mut self, body: MessageBody) -> Result<Self> {
        check_body(&body)?;
        self.body = Some(body);
        Ok(self)
    }

    /// Accept a body wrapping `payload`.
    pub fn payload(self, payload: impl Into<Payload>) -> Result<Self> {
        self.body(MessageBody::new(payload))
    }

    /// Seal the message. Both parts must have been accepted.
    pub fn build(self) -> Result<Message> {
        let header = self.header.ok_or(EnvelopeError::MissingHeader)?;
        let body = self.body.ok_or(EnvelopeError::MissingBody)?;
        Ok(Message { header, body })
    }
}
