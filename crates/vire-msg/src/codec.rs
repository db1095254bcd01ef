//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message schema helpers and protocol codecs."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Wire codecs.
//!
//! A codec turns a sealed [`Message`] into bytes for a given wire schema and
//! back. Payloads travel next to their `payload_type_id`; decoding looks the
//! id up in a [`PayloadRegistry`] and re-validates the rebuilt envelope, so a
//! decoded message is as well-formed as one assembled locally.
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::cms::{
    ResourceExecBaseResponse, ResourceExecFailureResponse, ResourceExecRequest,
    ResourceExecSuccessResponse,
};
use crate::header::MessageHeader;
use crate::identifier::ModelIdentifier;
use crate::logging::{log_message, MessageDirection};
use crate::message::Message;
use crate::payload::{Alarm, Payload};
use crate::{EnvelopeError, TypeIdentified};

/// Failures raised while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The codec does not handle the requested wire schema.
    #[error("unsupported wire schema '{0}'")]
    UnsupportedSchema(String),
    /// No decoder is registered for the payload type identifier.
    #[error("unknown payload type '{0}'")]
    UnknownPayloadType(String),
    /// JSON encoding or decoding failed.
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),
    /// CBOR encoding or decoding failed.
    #[error("cbor codec error: {0}")]
    Cbor(#[from] serde_cbor::Error),
    /// The envelope is not well-formed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Encoder/decoder for one family of wire schemas.
pub trait WireCodec: Send + Sync {
    /// Encode `message` under the wire schema `wire_type_id`.
    fn encode(&self, wire_type_id: &str, message: &Message) -> Result<Vec<u8>, CodecError>;
    /// Decode bytes produced under the wire schema `wire_type_id`.
    fn decode(&self, wire_type_id: &str, bytes: &[u8]) -> Result<Message, CodecError>;
    /// Codec name for logging.
    fn name(&self) -> &'static str;
}

type PayloadDecoder = fn(Value) -> serde_json::Result<Payload>;

fn decode_as<T>(value: Value) -> serde_json::Result<Payload>
where
    T: DeserializeOwned + Into<Payload>,
{
    serde_json::from_value::<T>(value).map(Into::into)
}

/// Payload decoders keyed by domain type identifier.
#[derive(Clone)]
pub struct PayloadRegistry {
    decoders: HashMap<&'static str, PayloadDecoder>,
}

impl PayloadRegistry {
    /// Registry without any decoder.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register the decoder of `T` under `T::TYPE_ID`.
    pub fn register<T>(&mut self)
    where
        T: TypeIdentified + DeserializeOwned + Into<Payload>,
    {
        self.decoders.insert(T::TYPE_ID, decode_as::<T>);
    }

    /// Whether a decoder is registered for `type_id`.
    pub fn contains(&self, type_id: &str) -> bool {
        self.decoders.contains_key(type_id)
    }

    /// Registered type identifiers.
    pub fn type_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Decode `value` as the payload type named by `type_id`.
    pub fn decode(&self, type_id: &ModelIdentifier, value: Value) -> Result<Payload, CodecError> {
        let decoder = self
            .decoders
            .get(type_id.name())
            .ok_or_else(|| CodecError::UnknownPayloadType(type_id.to_string()))?;
        Ok(decoder(value)?)
    }
}

impl Default for PayloadRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register::<Alarm>();
        registry.register::<ResourceExecRequest>();
        registry.register::<ResourceExecBaseResponse>();
        registry.register::<ResourceExecSuccessResponse>();
        registry.register::<ResourceExecFailureResponse>();
        registry
    }
}

impl fmt::Debug for PayloadRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.type_ids().collect();
        ids.sort_unstable();
        f.debug_struct("PayloadRegistry")
            .field("type_ids", &ids)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct WireBody {
    payload_type_id: ModelIdentifier,
    payload: Value,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    header: MessageHeader,
    body: WireBody,
}

fn check_schema(wire_type_id: &str) -> Result<(), CodecError> {
    if wire_type_id == Message::WIRE_TYPE_ID {
        Ok(())
    } else {
        Err(CodecError::UnsupportedSchema(wire_type_id.to_owned()))
    }
}

fn to_wire(message: &Message) -> Result<WireMessage, CodecError> {
    if !message.header().is_valid() {
        return Err(EnvelopeError::InvalidHeader.into());
    }
    let body = message.body();
    let payload = match body.payload() {
        Some(payload) if body.is_valid() => payload,
        _ => return Err(EnvelopeError::InvalidBody.into()),
    };
    Ok(WireMessage {
        header: message.header().clone(),
        body: WireBody {
            payload_type_id: body.payload_type_id().clone(),
            payload: payload.to_value()?,
        },
    })
}

fn from_wire(registry: &PayloadRegistry, wire: WireMessage) -> Result<Message, CodecError> {
    let payload = registry.decode(&wire.body.payload_type_id, wire.body.payload)?;
    let message = Message::builder()
        .header(wire.header)?
        .payload(payload)?
        .build()?;
    Ok(message)
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    registry: PayloadRegistry,
}

impl JsonCodec {
    /// Codec decoding every built-in payload type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec decoding the payload types of `registry`.
    pub fn with_registry(registry: PayloadRegistry) -> Self {
        Self { registry }
    }
}

impl WireCodec for JsonCodec {
    fn encode(&self, wire_type_id: &str, message: &Message) -> Result<Vec<u8>, CodecError> {
        check_schema(wire_type_id)?;
        let bytes = serde_json::to_vec(&to_wire(message)?)?;
        debug!(codec = self.name(), size = bytes.len(), "encoded message");
        log_message(MessageDirection::Outbound, message);
        Ok(bytes)
    }

    fn decode(&self, wire_type_id: &str, bytes: &[u8]) -> Result<Message, CodecError> {
        check_schema(wire_type_id)?;
        let wire: WireMessage = serde_json::from_slice(bytes)?;
        let message = from_wire(&self.registry, wire)?;
        log_message(MessageDirection::Inbound, &message);
        Ok(message)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Compact binary codec backed by `serde_cbor`.
#[derive(Debug, Clone, Default)]
pub struct CborCodec {
    registry: PayloadRegistry,
}

impl CborCodec {
    /// Codec decoding every built-in payload type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec decoding the payload types of `registry`.
    pub fn with_registry(registry: PayloadRegistry) -> Self {
        Self { registry }
    }
}

impl WireCodec for CborCodec {
    fn encode(&self, wire_type_id: &str, message: &Message) -> Result<Vec<u8>, CodecError> {
        check_schema(wire_type_id)?;
        let bytes = serde_cbor::to_vec(&to_wire(message)?)?;
        debug!(codec = self.name(), size = bytes.len(), "encoded message");
        log_message(MessageDirection::Outbound, message);
        Ok(bytes)
    }

    fn decode(&self, wire_type_id: &str, bytes: &[u8]) -> Result<Message, CodecError> {
        check_schema(wire_type_id)?;
        let wire: WireMessage = serde_cbor::from_slice(bytes)?;
        let message = from_wire(&self.registry, wire)?;
        log_message(MessageDirection::Inbound, &message);
        Ok(message)
    }

    fn name(&self) -> &'static str {
        "cbor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::ResourceStatusRecord;
    use crate::error::{ArgumentError, ResourceExecError};
    use crate::message_id::MessageIdentifier;
    use chrono::Utc;

    fn envelope(payload: impl Into<Payload>) -> Message {
        let mut header = MessageHeader::new(
            MessageIdentifier::new("vire.client.0", 5),
            ModelIdentifier::with_version("vire::message::body_format::typed_payload", "1.0")
                .expect("layout"),
        );
        header.add_metadata("user", "John").expect("metadata");
        Message::builder()
            .header(header)
            .and_then(|b| b.payload(payload))
            .and_then(|b| b.build())
            .expect("valid message")
    }

    #[test]
    fn json_roundtrip_preserves_request() {
        let mut request = ResourceExecRequest::new("R/Voltage/write");
        request.add_input_argument("value", "503.4 V").expect("arg");
        let message = envelope(request);
        let codec = JsonCodec::new();
        let bytes = codec
            .encode(Message::WIRE_TYPE_ID, &message)
            .expect("encode");
        let decoded = codec.decode(Message::WIRE_TYPE_ID, &bytes).expect("decode");
        assert_eq!(decoded, message);
        assert_eq!(
            decoded.body().payload_type_id().name(),
            "vire::cms::resource_exec_request"
        );
    }

    #[test]
    fn cbor_roundtrip_preserves_failure_response() {
        let mut response = ResourceExecFailureResponse::new(
            ArgumentError::invalid_argument_value("value", "-1 V"),
        );
        response.set_status(ResourceStatusRecord::new("R/Voltage/write", Utc::now()));
        let message = envelope(response);
        let codec = CborCodec::new();
        let bytes = codec
            .encode(Message::WIRE_TYPE_ID, &message)
            .expect("encode");
        let decoded = codec.decode(Message::WIRE_TYPE_ID, &bytes).expect("decode");
        assert_eq!(decoded, message);
    }

    #[test]
    fn rejects_foreign_schema() {
        let message = envelope(Alarm::new("warning", "coil hot"));
        let err = JsonCodec::new()
            .encode("vire.message.Other", &message)
            .expect_err("schema rejected");
        assert!(matches!(err, CodecError::UnsupportedSchema(s) if s == "vire.message.Other"));
    }

    #[test]
    fn unknown_payload_type_is_reported() {
        let message = envelope(ResourceExecFailureResponse::new(
            ResourceExecError::invalid_context(""),
        ));
        let mut registry = PayloadRegistry::empty();
        registry.register::<ResourceExecRequest>();
        let bytes = JsonCodec::new()
            .encode(Message::WIRE_TYPE_ID, &message)
            .expect("encode");
        let err = JsonCodec::with_registry(registry)
            .decode(Message::WIRE_TYPE_ID, &bytes)
            .expect_err("unknown payload");
        assert!(matches!(
            err,
            CodecError::UnknownPayloadType(id) if id == "vire::cms::resource_exec_failure_response"
        ));
    }

    #[test]
    fn decoded_envelope_is_revalidated() {
        let message = envelope(ResourceExecRequest::new("R/x"));
        let codec = JsonCodec::new();
        let bytes = codec
            .encode(Message::WIRE_TYPE_ID, &message)
            .expect("encode");
        let mut value: Value = serde_json::from_slice(&bytes).expect("json");
        value["header"]["timestamp"] = Value::Null;
        let tampered = serde_json::to_vec(&value).expect("json");
        let err = codec
            .decode(Message::WIRE_TYPE_ID, &tampered)
            .expect_err("invalid header");
        assert!(matches!(err, CodecError::Envelope(EnvelopeError::InvalidHeader)));
    }

    #[test]
    fn decoded_arguments_follow_construction_rules() {
        let mut request = ResourceExecRequest::new("R/Voltage/write");
        request.add_input_argument("value", "503.4 V").expect("arg");
        let codec = JsonCodec::new();
        let bytes = codec
            .encode(Message::WIRE_TYPE_ID, &envelope(request))
            .expect("encode");
        let original: Value = serde_json::from_slice(&bytes).expect("json");

        for arguments in [
            serde_json::json!([
                {"name": "value", "value_repr": "503.4 V"},
                {"name": "value", "value_repr": "0 V"}
            ]),
            serde_json::json!([{"name": "a.b", "value_repr": "1"}]),
            serde_json::json!([{"name": "value", "value_repr": ""}]),
        ] {
            let mut value = original.clone();
            value["body"]["payload"]["input_arguments"] = arguments;
            let tampered = serde_json::to_vec(&value).expect("json");
            let err = codec
                .decode(Message::WIRE_TYPE_ID, &tampered)
                .expect_err("arguments rejected");
            assert!(matches!(err, CodecError::Json(_)), "unexpected {err:?}");
        }
    }

    #[test]
    fn incomplete_message_is_not_encoded() {
        let err = CborCodec::new()
            .encode(Message::WIRE_TYPE_ID, &Message::default())
            .expect_err("empty message");
        assert!(matches!(err, CodecError::Envelope(EnvelopeError::InvalidHeader)));
    }

    #[test]
    fn default_registry_knows_builtin_payloads() {
        let registry = PayloadRegistry::default();
        for id in [
            Alarm::TYPE_ID,
            ResourceExecRequest::TYPE_ID,
            ResourceExecBaseResponse::TYPE_ID,
            ResourceExecSuccessResponse::TYPE_ID,
            ResourceExecFailureResponse::TYPE_ID,
        ] {
            assert!(registry.contains(id), "{id} not registered");
        }
    }
}
