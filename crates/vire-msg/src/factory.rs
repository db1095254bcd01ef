//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicI32, Ordering};

use indexmap::IndexMap;
use vire_common::config::EnvelopeConfig;

use crate::header::MessageHeader;
use crate::identifier::ModelIdentifier;
use crate::logging::{log_message, MessageDirection};
use crate::message::Message;
use crate::message_id::MessageIdentifier;
use crate::payload::{Category, Payload};
use crate::{EnvelopeError, Result};

/// Stamps outgoing envelopes for one emitter.
///
/// Sequence numbers start at 0 and wrap from `i32::MAX` back to 0, so the
/// invalid sentinel is never produced. The counter is atomic and the
/// factory can be shared by reference between producers.
#[derive(Debug)]
pub struct MessageFactory {
    emitter: String,
    body_layout_id: ModelIdentifier,
    asynchronous: bool,
    async_address: String,
    metadata: IndexMap<String, String>,
    next_number: AtomicI32,
}

impl MessageFactory {
    /// Synchronous factory without default metadata.
    pub fn new(emitter: impl Into<String>, body_layout_id: ModelIdentifier) -> Self {
        Self {
            emitter: emitter.into(),
            body_layout_id,
            asynchronous: false,
            async_address: String::new(),
            metadata: IndexMap::new(),
            next_number: AtomicI32::new(0),
        }
    }

    /// Factory following the envelope section of the application config.
    pub fn from_config(config: &EnvelopeConfig) -> Result<Self> {
        let body_layout_id = match &config.body_layout_version {
            Some(version) => ModelIdentifier::with_version(&config.body_layout_name, version)?,
            None => ModelIdentifier::new(&config.body_layout_name)?,
        };
        let mut factory = Self::new(config.emitter.clone(), body_layout_id);
        factory.asynchronous = config.asynchronous;
        factory.async_address = config.async_address().unwrap_or_default().to_owned();
        factory.metadata = config.metadata.clone();
        Ok(factory)
    }

    /// Emitter name stamped on every identifier.
    pub fn emitter(&self) -> &str {
        &self.emitter
    }

    /// Body layout stamped on every header.
    pub fn body_layout_id(&self) -> &ModelIdentifier {
        &self.body_layout_id
    }

    /// Allocate the next identifier of this emitter.
    pub fn next_message_id(&self) -> MessageIdentifier {
        let number = self
            .next_number
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(if n == i32::MAX { 0 } else { n + 1 })
            })
            .unwrap_or_else(|current| current);
        MessageIdentifier::new(self.emitter.clone(), number)
    }

    /// Fresh header with a new identifier, the current time and default metadata.
    pub fn header(&self) -> Result<MessageHeader> {
        let mut header = MessageHeader::new(self.next_message_id(), self.body_layout_id.clone());
        header.set_asynchronous(self.asynchronous);
        header.set_async_address(self.async_address.clone());
        for (key, value) in &self.metadata {
            header.add_metadata(key.clone(), value)?;
        }
        Ok(header)
    }

    /// Request envelope; responses follow the configured delivery mode.
    pub fn request(&self, payload: impl Into<Payload>) -> Result<Message> {
        let payload = expect_category(Category::Request, payload.into())?;
        self.seal(self.header()?, payload)
    }

    /// Event envelope.
    pub fn event(&self, payload: impl Into<Payload>) -> Result<Message> {
        let payload = expect_category(Category::Event, payload.into())?;
        self.seal(self.header()?, payload)
    }

    /// Synchronous response envelope correlated with `request`.
    pub fn reply(&self, request: &MessageHeader, payload: impl Into<Payload>) -> Result<Message> {
        let payload = expect_category(Category::Response, payload.into())?;
        let mut header = self.header()?;
        header.set_asynchronous(false);
        header.set_async_address("");
        header.set_in_reply_to(request.message_id().clone());
        self.seal(header, payload)
    }

    fn seal(&self, header: MessageHeader, payload: Payload) -> Result<Message> {
        let message = Message::builder().header(header)?.payload(payload)?.build()?;
        log_message(MessageDirection::Built, &message);
        Ok(message)
    }
}

fn expect_category(expected: Category, payload: Payload) -> Result<Payload> {
    let found = payload.category();
    if found == expected {
        Ok(payload)
    } else {
        Err(EnvelopeError::CategoryMismatch { expected, found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{ResourceExecBaseResponse, ResourceExecRequest};
    use crate::payload::Alarm;

    fn factory() -> MessageFactory {
        MessageFactory::from_config(&EnvelopeConfig::default()).expect("default config")
    }

    #[test]
    fn sequence_starts_at_zero() {
        let factory = factory();
        assert_eq!(factory.next_message_id().to_string(), "vire.client.0[0]");
        assert_eq!(factory.next_message_id().number(), 1);
        assert_eq!(
            factory.body_layout_id().to_string(),
            "vire::message::body_format::typed_payload-1.0"
        );
    }

    #[test]
    fn sequence_wraps_without_sentinel() {
        let factory = factory();
        factory.next_number.store(i32::MAX, Ordering::Relaxed);
        assert_eq!(factory.next_message_id().number(), i32::MAX);
        let wrapped = factory.next_message_id();
        assert_eq!(wrapped.number(), 0);
        assert!(wrapped.is_valid());
    }

    #[test]
    fn request_and_reply_are_correlated() {
        let factory = factory();
        let request = factory
            .request(ResourceExecRequest::new("R/Voltage/write"))
            .expect("request");
        assert!(request.is_valid());
        let reply = factory
            .reply(request.header(), ResourceExecBaseResponse::default())
            .expect("reply");
        assert_eq!(reply.header().in_reply_to(), Some(request.header().message_id()));
        assert_ne!(reply.header().message_id(), request.header().message_id());
    }

    #[test]
    fn category_is_checked() {
        let factory = factory();
        let err = factory
            .request(Alarm::new("warning", "coil hot"))
            .expect_err("event is not a request");
        assert_eq!(
            err,
            EnvelopeError::CategoryMismatch {
                expected: Category::Request,
                found: Category::Event,
            }
        );
        assert!(factory.event(Alarm::new("warning", "coil hot")).is_ok());
        assert!(factory
            .event(ResourceExecRequest::new("R/x"))
            .is_err());
    }

    #[test]
    fn configured_defaults_reach_the_header() {
        let mut config = EnvelopeConfig::default();
        config.asynchronous = true;
        config.async_address = Some("tcp://vire-server:7000".into());
        config.metadata.insert("user".into(), "John".into());
        let factory = MessageFactory::from_config(&config).expect("config");
        let request = factory
            .request(ResourceExecRequest::new("R/x"))
            .expect("request");
        assert!(request.header().is_asynchronous());
        assert_eq!(request.header().async_address(), "tcp://vire-server:7000");
        assert_eq!(request.header().metadata_value("user"), Ok("John"));

        let reply = factory
            .reply(request.header(), ResourceExecBaseResponse::default())
            .expect("reply");
        assert!(!reply.header().is_asynchronous());
    }

    #[test]
    fn keyless_default_metadata_is_rejected() {
        let mut keyless = MessageFactory::new("vire.client.0", factory().body_layout_id().clone());
        keyless.metadata.insert(String::new(), "orphan".into());
        assert!(matches!(
            keyless.request(ResourceExecRequest::new("R/x")),
            Err(EnvelopeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_layout_name_is_rejected() {
        let mut config = EnvelopeConfig::default();
        config.body_layout_name.clear();
        assert!(matches!(
            MessageFactory::from_config(&config),
            Err(EnvelopeError::InvalidName { .. })
        ));
    }
}
