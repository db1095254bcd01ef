//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
use std::fmt;

use crate::dump::{self, TreeDump};
use crate::identifier::ModelIdentifier;
use crate::payload::Payload;
use crate::TypeIdentified;

/// Payload plus the type identifier derived from it.
///
/// The type identifier cannot be set directly: it is recomputed each time a
/// payload is installed and cleared with the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBody {
    payload_type_id: ModelIdentifier,
    payload: Option<Payload>,
}

impl MessageBody {
    /// Body wrapping `payload`.
    pub fn new(payload: impl Into<Payload>) -> Self {
        let mut body = Self::default();
        body.set_payload(payload);
        body
    }

    /// Whether a payload is installed.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Installed payload.
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Replace the payload and derive its type identifier.
    pub fn set_payload(&mut self, payload: impl Into<Payload>) {
        self.remove_payload();
        let payload = payload.into();
        self.payload_type_id = ModelIdentifier::from_type_id(payload.type_id());
        self.payload = Some(payload);
    }

    /// Remove the payload together with its type identifier.
    pub fn remove_payload(&mut self) -> Option<Payload> {
        self.payload_type_id.reset();
        self.payload.take()
    }

    /// Whether a payload type identifier is set.
    pub fn has_payload_type_id(&self) -> bool {
        self.payload_type_id.is_valid()
    }

    /// Type identifier of the installed payload.
    pub fn payload_type_id(&self) -> &ModelIdentifier {
        &self.payload_type_id
    }

    /// Payload and type identifier both present.
    pub fn is_valid(&self) -> bool {
        self.has_payload_type_id() && self.has_payload()
    }

    /// Back to an empty body.
    pub fn reset(&mut self) {
        self.remove_payload();
    }

    /// Take the payload out of the body.
    pub fn into_payload(self) -> Option<Payload> {
        self.payload
    }
}

impl TypeIdentified for MessageBody {
    const TYPE_ID: &'static str = "vire::message::message_body";
    const WIRE_TYPE_ID: &'static str = "vire.message.MessageBody";
}

impl TreeDump for MessageBody {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        if self.has_payload_type_id() {
            writeln!(
                out,
                "{indent}{}Payload type ID : '{}'",
                dump::TAG,
                self.payload_type_id
            )?;
        } else {
            writeln!(out, "{indent}{}Payload type ID : <none>", dump::TAG)?;
        }
        match &self.payload {
            Some(payload) => {
                writeln!(out, "{indent}{}Payload :", dump::TAG)?;
                payload.tree_dump(out, "", &format!("{indent}{}", dump::SKIP_TAG), false)?;
            }
            None => writeln!(out, "{indent}{}Payload : <none>", dump::TAG)?,
        }
        writeln!(
            out,
            "{indent}{}Validity : {}",
            dump::inherit_tag(inherit),
            self.is_valid()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{ResourceExecBaseResponse, ResourceExecRequest};

    #[test]
    fn payload_type_is_derived() {
        let mut body = MessageBody::default();
        assert!(!body.is_valid());

        body.set_payload(ResourceExecRequest::new("R/Voltage/write"));
        assert!(body.is_valid());
        assert_eq!(
            body.payload_type_id().name(),
            "vire::cms::resource_exec_request"
        );

        body.set_payload(ResourceExecBaseResponse::default());
        assert_eq!(
            body.payload_type_id().name(),
            "vire::cms::resource_base_response"
        );
        assert!(body.payload().is_some_and(Payload::is_response));
    }

    #[test]
    fn removing_payload_clears_type_id() {
        let mut body = MessageBody::new(ResourceExecRequest::new("R/x"));
        let removed = body.remove_payload();
        assert!(removed.is_some_and(|p| p.is_request()));
        assert!(!body.has_payload_type_id());
        assert!(!body.is_valid());
        assert!(body.remove_payload().is_none());
    }

    #[test]
    fn dump_nests_payload() {
        let body = MessageBody::new(ResourceExecRequest::new("R/x"));
        let dump = body.to_tree_string("Message body:");
        assert!(dump.starts_with(
            "Message body:\n|-- Payload type ID : 'vire::cms::resource_exec_request'\n|-- Payload :\n"
        ));
        assert!(dump.contains("|   |-- Category : request\n"));
        assert!(dump.ends_with("`-- Validity : true\n"));
        assert!(MessageBody::default()
            .to_tree_string("")
            .contains("|-- Payload : <none>\n"));
    }
}
