//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Message header: identity, correlation, delivery mode and metadata.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::dump::{self, TreeDump};
use crate::identifier::ModelIdentifier;
use crate::message_id::MessageIdentifier;
use crate::metadata::MetadataEntry;
use crate::{EnvelopeError, Result, TypeIdentified};

/// Routing and identity part of a message.
///
/// Metadata keys may repeat; lookups return the first entry with the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    #[serde(default)]
    message_id: MessageIdentifier,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    in_reply_to: Option<MessageIdentifier>,
    #[serde(default)]
    asynchronous: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    async_address: String,
    #[serde(default)]
    body_layout_id: ModelIdentifier,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "keyed_metadata"
    )]
    metadata: Vec<MetadataEntry>,
}

fn keyed_metadata<'de, D>(deserializer: D) -> std::result::Result<Vec<MetadataEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<MetadataEntry>::deserialize(deserializer)?;
    if entries.iter().all(MetadataEntry::is_valid) {
        Ok(entries)
    } else {
        Err(de::Error::custom("metadata entry without key"))
    }
}

impl MessageHeader {
    /// Synchronous header stamped with the current time.
    pub fn new(message_id: MessageIdentifier, body_layout_id: ModelIdentifier) -> Self {
        Self {
            message_id,
            timestamp: Some(vire_common::time::now()),
            body_layout_id,
            ..Self::default()
        }
    }

    /// Message identity.
    pub fn message_id(&self) -> &MessageIdentifier {
        &self.message_id
    }

    /// Replace the message identity.
    pub fn set_message_id(&mut self, message_id: MessageIdentifier) {
        self.message_id = message_id;
    }

    /// Emission time.
    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        self.timestamp.as_ref()
    }

    /// Replace the emission time.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = Some(timestamp);
    }

    /// Whether this message answers another one.
    pub fn has_in_reply_to(&self) -> bool {
        self.in_reply_to.is_some()
    }

    /// Identity of the message this one answers.
    pub fn in_reply_to(&self) -> Option<&MessageIdentifier> {
        self.in_reply_to.as_ref()
    }

    /// Correlate this message with `request_id`.
    pub fn set_in_reply_to(&mut self, request_id: MessageIdentifier) {
        self.in_reply_to = Some(request_id);
    }

    /// Drop the correlation.
    pub fn reset_in_reply_to(&mut self) {
        self.in_reply_to = None;
    }

    /// Whether the response is expected on a separate channel.
    pub fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }

    /// Switch the delivery mode.
    pub fn set_asynchronous(&mut self, asynchronous: bool) {
        self.asynchronous = asynchronous;
    }

    /// Whether an address for asynchronous responses is set.
    pub fn has_async_address(&self) -> bool {
        !self.async_address.is_empty()
    }

    /// Address for asynchronous responses.
    pub fn async_address(&self) -> &str {
        &self.async_address
    }

    /// Replace the address for asynchronous responses.
    pub fn set_async_address(&mut self, address: impl Into<String>) {
        self.async_address = address.into();
    }

    /// Layout of the body, used by receivers to pick a decoder.
    pub fn body_layout_id(&self) -> &ModelIdentifier {
        &self.body_layout_id
    }

    /// Replace the body layout.
    pub fn set_body_layout_id(&mut self, body_layout_id: ModelIdentifier) {
        self.body_layout_id = body_layout_id;
    }

    /// Append a metadata entry. Any `Display` value is stored as text; the
    /// key must not be empty.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl fmt::Display) -> Result<()> {
        let entry = MetadataEntry::new(key, value);
        if !entry.is_valid() {
            return Err(EnvelopeError::InvalidArgument(format!(
                "metadata entry '{entry}' has no key"
            )));
        }
        self.metadata.push(entry);
        Ok(())
    }

    /// Whether an entry with `key` exists.
    pub fn has_metadata(&self, key: &str) -> bool {
        self.metadata.iter().any(|entry| entry.key == key)
    }

    /// Value of the first entry with `key`.
    pub fn metadata_value(&self, key: &str) -> Result<&str> {
        self.metadata
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
            .ok_or_else(|| EnvelopeError::MissingMetadata(key.to_owned()))
    }

    /// All entries in insertion order.
    pub fn metadata(&self) -> &[MetadataEntry] {
        &self.metadata
    }

    /// Remove every metadata entry.
    pub fn clear_metadata(&mut self) {
        self.metadata.clear();
    }

    /// Identity, timestamp, correlation, body layout and delivery mode are
    /// all consistent.
    pub fn is_valid(&self) -> bool {
        self.message_id.is_valid()
            && self.timestamp.is_some()
            && self.in_reply_to.as_ref().map_or(true, MessageIdentifier::is_valid)
            && self.body_layout_id.is_valid()
            && (!self.asynchronous || self.has_async_address())
    }

    /// Back to an empty, invalid header.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl TypeIdentified for MessageHeader {
    const TYPE_ID: &'static str = "vire::message::message_header";
    const WIRE_TYPE_ID: &'static str = "vire.message.MessageHeader";
}

impl TreeDump for MessageHeader {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        writeln!(out, "{indent}{}Message ID : {}", dump::TAG, self.message_id)?;
        writeln!(
            out,
            "{indent}{}Timestamp : {}",
            dump::TAG,
            vire_common::time::format_optional(self.timestamp.as_ref())
        )?;
        match &self.in_reply_to {
            Some(id) => writeln!(out, "{indent}{}In reply to : {id}", dump::TAG)?,
            None => writeln!(out, "{indent}{}In reply to : <none>", dump::TAG)?,
        }
        writeln!(
            out,
            "{indent}{}Asynchronous : {}",
            dump::TAG,
            self.asynchronous
        )?;
        if self.asynchronous {
            writeln!(
                out,
                "{indent}{}Async address : {}",
                dump::TAG,
                dump::quoted_or_none(&self.async_address)
            )?;
        }
        writeln!(
            out,
            "{indent}{}Body layout ID : '{}'",
            dump::TAG,
            self.body_layout_id
        )?;
        if self.metadata.is_empty() {
            writeln!(out, "{indent}{}Metadata : <none>", dump::TAG)?;
        } else {
            writeln!(out, "{indent}{}Metadata : [{}]", dump::TAG, self.metadata.len())?;
            dump::write_items(
                out,
                &format!("{indent}{}", dump::SKIP_TAG),
                "Metadata",
                self.metadata.iter(),
            )?;
        }
        writeln!(
            out,
            "{indent}{}Validity : {}",
            dump::inherit_tag(inherit),
            self.is_valid()
        )
    }
}
