//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Payload classification.
//!
//! [`Payload`] is a closed union whose outer variant is the payload
//! [`Category`]; the inner enums list the concrete payload types of each
//! category. New payload kinds are added by extending an inner enum.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cms::{
    ResourceExecBaseResponse, ResourceExecFailureResponse, ResourceExecRequest,
    ResourceExecSuccessResponse,
};
use crate::dump::{self, TreeDump};
use crate::TypeIdentified;

/// Fixed classification of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Request RPC object.
    Request,
    /// Response RPC object.
    Response,
    /// Event object.
    Event,
}

impl Category {
    /// Lower-case label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Request => "request",
            Category::Response => "response",
            Category::Event => "event",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Alarm raised by a resource or a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    message: String,
}

impl Alarm {
    /// Alarm stamped with the current time.
    pub fn new(severity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(vire_common::time::now(), severity, message)
    }

    /// Alarm stamped with `timestamp`.
    pub fn at(
        timestamp: DateTime<Utc>,
        severity: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Some(timestamp),
            severity: severity.into(),
            message: message.into(),
        }
    }

    /// Whether the occurrence time is set.
    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }

    /// Occurrence time.
    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        self.timestamp.as_ref()
    }

    /// Replace the occurrence time.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = Some(timestamp);
    }

    /// Severity label (e.g. `warning`, `critical`).
    pub fn severity(&self) -> &str {
        &self.severity
    }

    /// Replace the severity label.
    pub fn set_severity(&mut self, severity: impl Into<String>) {
        self.severity = severity.into();
    }

    /// Free-form description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Replace the description.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}

impl TypeIdentified for Alarm {
    const TYPE_ID: &'static str = "vire::utility::base_alarm";
    const WIRE_TYPE_ID: &'static str = "vire.utility.BaseAlarm";
}

impl TreeDump for Alarm {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        writeln!(
            out,
            "{indent}{}Timestamp : {}",
            dump::TAG,
            vire_common::time::format_optional(self.timestamp.as_ref())
        )?;
        writeln!(
            out,
            "{indent}{}Severity : {}",
            dump::TAG,
            dump::quoted_or_none(&self.severity)
        )?;
        writeln!(
            out,
            "{indent}{}Message : {}",
            dump::inherit_tag(inherit),
            dump::quoted_or_none(&self.message)
        )
    }
}

/// Event payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Alarm notification.
    Alarm(Alarm),
}

impl EventPayload {
    /// Occurrence time of the event.
    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            EventPayload::Alarm(alarm) => alarm.timestamp(),
        }
    }
}

/// Request payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    /// Execute a method on a resource.
    ResourceExec(ResourceExecRequest),
}

/// Response payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Bare execution response carrying only the resource status.
    ResourceExec(ResourceExecBaseResponse),
    /// Successful execution with output arguments.
    ResourceExecSuccess(ResourceExecSuccessResponse),
    /// Failed execution with its domain error.
    ResourceExecFailure(ResourceExecFailureResponse),
}

impl ResponsePayload {
    /// Resource status attached to the response, if any.
    pub fn status(&self) -> Option<&crate::cms::ResourceStatusRecord> {
        match self {
            ResponsePayload::ResourceExec(r) => r.status(),
            ResponsePayload::ResourceExecSuccess(r) => r.status(),
            ResponsePayload::ResourceExecFailure(r) => r.status(),
        }
    }
}

/// Unit of content carried by a message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Notification not expecting a reply.
    Event(EventPayload),
    /// RPC request.
    Request(RequestPayload),
    /// RPC response.
    Response(ResponsePayload),
}

/// Apply `$body` to the concrete payload held by `$payload`.
macro_rules! with_concrete {
    ($payload:expr, $inner:ident => $body:expr) => {
        match $payload {
            Payload::Event(EventPayload::Alarm($inner)) => $body,
            Payload::Request(RequestPayload::ResourceExec($inner)) => $body,
            Payload::Response(ResponsePayload::ResourceExec($inner)) => $body,
            Payload::Response(ResponsePayload::ResourceExecSuccess($inner)) => $body,
            Payload::Response(ResponsePayload::ResourceExecFailure($inner)) => $body,
        }
    };
}

/// Static type identifiers of the concrete type `T`.
fn ids_of<T: TypeIdentified>(_: &T) -> (&'static str, &'static str) {
    (T::TYPE_ID, T::WIRE_TYPE_ID)
}

impl Payload {
    /// Category, fixed by the variant.
    pub fn category(&self) -> Category {
        match self {
            Payload::Event(_) => Category::Event,
            Payload::Request(_) => Category::Request,
            Payload::Response(_) => Category::Response,
        }
    }

    /// Whether this is a request.
    pub fn is_request(&self) -> bool {
        self.category() == Category::Request
    }

    /// Whether this is a response.
    pub fn is_response(&self) -> bool {
        self.category() == Category::Response
    }

    /// Whether this is an event.
    pub fn is_event(&self) -> bool {
        self.category() == Category::Event
    }

    /// Declared domain type identifier of the concrete payload.
    pub fn type_id(&self) -> &'static str {
        with_concrete!(self, inner => ids_of(inner).0)
    }

    /// Declared wire-schema identifier of the concrete payload.
    pub fn wire_type_id(&self) -> &'static str {
        with_concrete!(self, inner => ids_of(inner).1)
    }

    /// Serde representation of the concrete payload.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        with_concrete!(self, inner => serde_json::to_value(inner))
    }

    /// The resource execution request, if that is what this payload is.
    pub fn as_resource_exec_request(&self) -> Option<&ResourceExecRequest> {
        match self {
            Payload::Request(RequestPayload::ResourceExec(request)) => Some(request),
            _ => None,
        }
    }

    /// The response payload, if this is a response.
    pub fn as_response(&self) -> Option<&ResponsePayload> {
        match self {
            Payload::Response(response) => Some(response),
            _ => None,
        }
    }

    /// The event payload, if this is an event.
    pub fn as_event(&self) -> Option<&EventPayload> {
        match self {
            Payload::Event(event) => Some(event),
            _ => None,
        }
    }
}

impl From<Alarm> for Payload {
    fn from(alarm: Alarm) -> Self {
        Payload::Event(EventPayload::Alarm(alarm))
    }
}

impl From<ResourceExecRequest> for Payload {
    fn from(request: ResourceExecRequest) -> Self {
        Payload::Request(RequestPayload::ResourceExec(request))
    }
}

impl From<ResourceExecBaseResponse> for Payload {
    fn from(response: ResourceExecBaseResponse) -> Self {
        Payload::Response(ResponsePayload::ResourceExec(response))
    }
}

impl From<ResourceExecSuccessResponse> for Payload {
    fn from(response: ResourceExecSuccessResponse) -> Self {
        Payload::Response(ResponsePayload::ResourceExecSuccess(response))
    }
}

impl From<ResourceExecFailureResponse> for Payload {
    fn from(response: ResourceExecFailureResponse) -> Self {
        Payload::Response(ResponsePayload::ResourceExecFailure(response))
    }
}

impl TreeDump for Payload {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        writeln!(out, "{indent}{}Category : {}", dump::TAG, self.category())?;
        writeln!(out, "{indent}{}Type ID : '{}'", dump::TAG, self.type_id())?;
        with_concrete!(self, inner => inner.tree_dump(out, "", indent, inherit))
    }
}
