//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Typed message envelope for the Vire control-system RPC layer.
//!
//! A [`Message`] pairs a [`MessageHeader`] (identity, correlation, delivery
//! mode, metadata) with a [`MessageBody`] wrapping a [`Payload`]. Headers and
//! bodies are validated when they are attached, so a sealed message is always
//! well-formed. Business failures travel inside response payloads as
//! [`error::DomainError`] values and are never raised by the envelope code.
#![warn(missing_docs)]

pub mod body;
pub mod cms;
pub mod codec;
pub mod dump;
pub mod error;
pub mod factory;
pub mod header;
pub mod identifier;
pub mod logging;
pub mod message;
pub mod message_id;
pub mod metadata;
pub mod payload;

/// Stable type identification exposed to the codec layer.
pub trait TypeIdentified {
    /// Domain type identifier, `vire::namespace::class` style.
    const TYPE_ID: &'static str;
    /// Wire-schema identifier, `vire.namespace.ClassName` style.
    const WIRE_TYPE_ID: &'static str;
}

/// Shared result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Structural violations raised while building envelopes.
///
/// Every operation returning this error leaves its receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The identifier kind's policy rejected a name.
    #[error("invalid {kind} name '{name}'")]
    InvalidName {
        /// Identifier kind label.
        kind: &'static str,
        /// Rejected name.
        name: String,
    },
    /// An identifier version representation was rejected.
    #[error("invalid version '{0}'")]
    InvalidVersion(String),
    /// A header was attached while not satisfying the header invariant.
    #[error("invalid message header")]
    InvalidHeader,
    /// A body was attached without both payload and payload type identifier.
    #[error("invalid message body")]
    InvalidBody,
    /// The builder was sealed before a header was attached.
    #[error("message header is missing")]
    MissingHeader,
    /// The builder was sealed before a body was attached.
    #[error("message body is missing")]
    MissingBody,
    /// A method argument name is already present.
    #[error("argument named '{0}' already exists")]
    DuplicateArgument(String),
    /// No method argument has the requested name.
    #[error("no argument named '{0}'")]
    MissingArgument(String),
    /// A method argument could not be constructed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// No metadata entry has the requested key.
    #[error("no metadata with key '{0}'")]
    MissingMetadata(String),
    /// A payload was used where another category is required.
    #[error("expected a {expected} payload, found a {found} payload")]
    CategoryMismatch {
        /// Category required by the operation.
        expected: payload::Category,
        /// Category of the offered payload.
        found: payload::Category,
    },
}

pub use body::MessageBody;
pub use cms::{
    ExecFailure, MethodArgument, ResourceExecBaseResponse, ResourceExecFailureResponse,
    ResourceExecRequest, ResourceExecSuccessResponse, ResourceStatusRecord,
};
pub use codec::{CborCodec, CodecError, JsonCodec, PayloadRegistry, WireCodec};
pub use dump::TreeDump;
pub use error::{BaseError, DomainError, RenderMessage};
pub use factory::MessageFactory;
pub use header::MessageHeader;
pub use identifier::{InstanceIdentifier, ModelIdentifier};
pub use logging::{log_message, MessageDirection};
pub use message::{Message, MessageBuilder};
pub use message_id::MessageIdentifier;
pub use metadata::MetadataEntry;
pub use payload::{Alarm, Category, EventPayload, Payload, RequestPayload, ResponsePayload};
