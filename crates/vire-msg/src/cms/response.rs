//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Resource execution payloads and status records."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Responses to a [`super::ResourceExecRequest`].
//!
//! Every response may carry the status of the target resource at the time
//! of execution. Business failures are data here: the failure response holds
//! a domain error, never an `Err`.
use std::fmt;

use serde::{Deserialize, Serialize};

use super::argument::{ArgumentList, MethodArgument};
use super::status::ResourceStatusRecord;
use crate::dump::{self, TreeDump};
use crate::error::{ArgumentError, ResourceExecError};
use crate::{Result, TypeIdentified};

fn dump_status(
    status: Option<&ResourceStatusRecord>,
    out: &mut dyn fmt::Write,
    indent: &str,
    tag: &str,
    skip_tag: &str,
) -> fmt::Result {
    match status {
        Some(status) => {
            writeln!(out, "{indent}{tag}Status :")?;
            status.tree_dump(out, "", &format!("{indent}{skip_tag}"), false)
        }
        None => writeln!(out, "{indent}{tag}Status : <none>"),
    }
}

/// Response holding only the resource status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceExecBaseResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<ResourceStatusRecord>,
}

impl ResourceExecBaseResponse {
    /// Response carrying `status`.
    pub fn with_status(status: ResourceStatusRecord) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Whether a status record is attached.
    pub fn has_status(&self) -> bool {
        self.status.is_some()
    }

    /// Attached status record.
    pub fn status(&self) -> Option<&ResourceStatusRecord> {
        self.status.as_ref()
    }

    /// Attach `status`, replacing any previous record.
    pub fn set_status(&mut self, status: ResourceStatusRecord) {
        self.status = Some(status);
    }

    /// Detach the status record.
    pub fn reset_status(&mut self) {
        self.status = None;
    }
}

impl TypeIdentified for ResourceExecBaseResponse {
    const TYPE_ID: &'static str = "vire::cms::resource_base_response";
    const WIRE_TYPE_ID: &'static str = "vire.cms.ResourceBaseResponse";
}

impl TreeDump for ResourceExecBaseResponse {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        dump_status(
            self.status(),
            out,
            indent,
            dump::inherit_tag(inherit),
            dump::inherit_skip_tag(inherit),
        )
    }
}

/// Successful execution, with the method's output arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceExecSuccessResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<ResourceStatusRecord>,
    #[serde(default)]
    output_arguments: ArgumentList,
}

impl ResourceExecSuccessResponse {
    /// Success response carrying `status`.
    pub fn with_status(status: ResourceStatusRecord) -> Self {
        Self {
            status: Some(status),
            output_arguments: ArgumentList::default(),
        }
    }

    /// Attached status record.
    pub fn status(&self) -> Option<&ResourceStatusRecord> {
        self.status.as_ref()
    }

    /// Attach `status`, replacing any previous record.
    pub fn set_status(&mut self, status: ResourceStatusRecord) {
        self.status = Some(status);
    }

    /// Append an output argument. Fails on an invalid or duplicate name.
    pub fn add_output_argument(
        &mut self,
        name: impl Into<String>,
        value_repr: impl Into<String>,
    ) -> Result<()> {
        self.output_arguments
            .push(MethodArgument::new(name, value_repr)?)
    }

    /// Append an output argument carrying meta information.
    pub fn add_output_argument_with_meta(
        &mut self,
        name: impl Into<String>,
        value_repr: impl Into<String>,
        meta: impl Into<String>,
    ) -> Result<()> {
        self.output_arguments
            .push(MethodArgument::with_meta(name, value_repr, meta)?)
    }

    /// Output argument named `name`.
    pub fn output_argument(&self, name: &str) -> Result<&MethodArgument> {
        self.output_arguments.get(name)
    }

    /// Number of output arguments.
    pub fn number_of_output_arguments(&self) -> usize {
        self.output_arguments.len()
    }

    /// Output arguments in insertion order.
    pub fn output_arguments(&self) -> &ArgumentList {
        &self.output_arguments
    }

    /// Remove every output argument.
    pub fn clear_output_arguments(&mut self) {
        self.output_arguments.clear();
    }
}

impl TypeIdentified for ResourceExecSuccessResponse {
    const TYPE_ID: &'static str = "vire::cms::resource_exec_success_response";
    const WIRE_TYPE_ID: &'static str = "vire.cms.ResourceExecSuccessResponse";
}

impl TreeDump for ResourceExecSuccessResponse {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        dump_status(self.status(), out, indent, dump::TAG, dump::SKIP_TAG)?;
        self.output_arguments
            .dump_section(out, indent, "Output argument", inherit)
    }
}

/// Domain error reported by a failed execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type_id", content = "value")]
pub enum ExecFailure {
    /// Arguments were rejected.
    #[serde(rename = "vire::cms::argument_error")]
    Argument(ArgumentError),
    /// The execution itself failed (invalid context, timeout).
    #[serde(rename = "vire::cms::resource_exec_error")]
    ResourceExec(ResourceExecError),
}

impl ExecFailure {
    /// Domain type identifier of the carried error.
    pub fn type_id(&self) -> &'static str {
        match self {
            ExecFailure::Argument(_) => ArgumentError::TYPE_ID,
            ExecFailure::ResourceExec(_) => ResourceExecError::TYPE_ID,
        }
    }

    /// Code of the carried error.
    pub fn code(&self) -> i32 {
        match self {
            ExecFailure::Argument(error) => error.code(),
            ExecFailure::ResourceExec(error) => error.code(),
        }
    }

    /// Rendered message of the carried error.
    pub fn message(&self) -> &str {
        match self {
            ExecFailure::Argument(error) => error.message(),
            ExecFailure::ResourceExec(error) => error.message(),
        }
    }
}

impl Default for ExecFailure {
    fn default() -> Self {
        ExecFailure::ResourceExec(ResourceExecError::invalid_context(""))
    }
}

impl From<ArgumentError> for ExecFailure {
    fn from(error: ArgumentError) -> Self {
        ExecFailure::Argument(error)
    }
}

impl From<ResourceExecError> for ExecFailure {
    fn from(error: ResourceExecError) -> Self {
        ExecFailure::ResourceExec(error)
    }
}

impl fmt::Display for ExecFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecFailure::Argument(error) => fmt::Display::fmt(error, f),
            ExecFailure::ResourceExec(error) => fmt::Display::fmt(error, f),
        }
    }
}

/// Failed execution and its cause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceExecFailureResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<ResourceStatusRecord>,
    #[serde(default)]
    error: ExecFailure,
}

impl ResourceExecFailureResponse {
    /// Failure response reporting `error`.
    pub fn new(error: impl Into<ExecFailure>) -> Self {
        Self {
            status: None,
            error: error.into(),
        }
    }

    /// Attached status record.
    pub fn status(&self) -> Option<&ResourceStatusRecord> {
        self.status.as_ref()
    }

    /// Attach `status`, replacing any previous record.
    pub fn set_status(&mut self, status: ResourceStatusRecord) {
        self.status = Some(status);
    }

    /// Reported error.
    pub fn error(&self) -> &ExecFailure {
        &self.error
    }

    /// Replace the reported error.
    pub fn set_error(&mut self, error: impl Into<ExecFailure>) {
        self.error = error.into();
    }

    /// Domain type identifier of the reported error.
    pub fn error_type_id(&self) -> &'static str {
        self.error.type_id()
    }
}

impl TypeIdentified for ResourceExecFailureResponse {
    const TYPE_ID: &'static str = "vire::cms::resource_exec_failure_response";
    const WIRE_TYPE_ID: &'static str = "vire.cms.ResourceExecFailureResponse";
}

impl TreeDump for ResourceExecFailureResponse {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        dump_status(self.status(), out, indent, dump::TAG, dump::SKIP_TAG)?;
        writeln!(
            out,
            "{indent}{}Error type ID : '{}'",
            dump::TAG,
            self.error_type_id()
        )?;
        writeln!(out, "{indent}{}Error :", dump::inherit_tag(inherit))?;
        let nested = format!("{indent}{}", dump::inherit_skip_tag(inherit));
        match &self.error {
            ExecFailure::Argument(error) => error.tree_dump(out, "", &nested, false),
            ExecFailure::ResourceExec(error) => error.tree_dump(out, "", &nested, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn base_response_status_is_optional() {
        let mut response = ResourceExecBaseResponse::default();
        assert!(!response.has_status());
        let mut record = ResourceStatusRecord::new("R/Voltage/read", Utc::now());
        record.set_pending(true);
        response.set_status(record.clone());
        assert_eq!(response.status(), Some(&record));
        response.reset_status();
        assert!(response.status().is_none());
        assert!(response.to_tree_string("").ends_with("`-- Status : <none>\n"));
    }

    #[test]
    fn success_collects_output_arguments() {
        let mut response =
            ResourceExecSuccessResponse::with_status(ResourceStatusRecord::new("R/x", Utc::now()));
        response.add_output_argument("value", "503.4 V").expect("value");
        assert!(response.add_output_argument("value", "0 V").is_err());
        assert_eq!(response.number_of_output_arguments(), 1);
        assert_eq!(
            response.output_argument("value").expect("present").value_repr(),
            "503.4 V"
        );
        let dump = response.to_tree_string("Success:");
        assert!(dump.contains("|-- Status :\n|   |-- Path : 'R/x'\n"));
        assert!(dump.ends_with("    `-- Output argument = value='503.4 V'\n"));
    }

    #[test]
    fn failure_carries_domain_error_as_data() {
        let mut response =
            ResourceExecFailureResponse::new(ArgumentError::invalid_argument("voltage"));
        assert_eq!(response.error_type_id(), "vire::cms::argument_error");
        assert_eq!(response.error().code(), ArgumentError::EC_INVALID_ARG);
        assert_eq!(response.error().message(), "Invalid argument 'voltage'");

        response.set_error(ResourceExecError::invalid_context("bus offline"));
        assert_eq!(response.error_type_id(), "vire::cms::resource_exec_error");
        assert_eq!(response.error().to_string(), "[code=100] bus offline");
    }

    #[test]
    fn failure_serializes_error_with_its_type_id() {
        let response = ResourceExecFailureResponse::new(ResourceExecError::invalid_context(""));
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["error"]["type_id"], "vire::cms::resource_exec_error");
        assert_eq!(json["error"]["value"]["code"], 100);
        let back: ResourceExecFailureResponse =
            serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, response);
    }
}
