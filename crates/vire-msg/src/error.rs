//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Domain errors: business failures carried as data inside response payloads.
//!
//! A [`DomainError`] stores a numeric code and a message template. The
//! rendered message is produced by the kind-specific [`RenderMessage`]
//! implementation on first read and cached until an input to the rendering
//! changes. Codes up to [`EC_MAXIMUM_SYSTEM`] are reserved for the system;
//! application kinds start numbering at `EC_MAXIMUM_SYSTEM + 1`.
use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dump::{self, TreeDump};
use crate::TypeIdentified;

/// No error.
pub const EC_SUCCESS: i32 = 0;
/// Generic error code.
pub const EC_GENERIC_FAILURE: i32 = 1;
/// Highest reserved system error code.
pub const EC_MAXIMUM_SYSTEM: i32 = 99;

/// Kind-specific rendering of a message template.
pub trait RenderMessage:
    Default + Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync
{
    /// Domain type identifier of the error kind.
    const TYPE_ID: &'static str;
    /// Wire-schema identifier of the error kind.
    const WIRE_TYPE_ID: &'static str;

    /// Substitute placeholders of `format` using the captured inputs.
    fn build_message(&self, code: i32, format: &str) -> String;

    /// Extra tree-dump lines for the captured inputs.
    fn dump_detail(&self, out: &mut dyn fmt::Write, indent: &str) -> fmt::Result {
        let _ = (out, indent);
        Ok(())
    }
}

/// Code plus message template with a render-on-read cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct DomainError<D: RenderMessage = Plain> {
    code: i32,
    message_format: String,
    #[serde(default)]
    detail: D,
    #[serde(skip)]
    cache: OnceCell<String>,
}

/// Error without placeholder substitution.
pub type BaseError = DomainError<Plain>;

impl<D: RenderMessage> Default for DomainError<D> {
    fn default() -> Self {
        Self::new(EC_GENERIC_FAILURE, "")
    }
}

impl<D: RenderMessage> PartialEq for DomainError<D> {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.message_format == other.message_format
            && self.detail == other.detail
    }
}

impl<D: RenderMessage> DomainError<D> {
    /// Construct with the kind's default captured inputs.
    pub fn new(code: i32, message_format: impl Into<String>) -> Self {
        Self::with_detail(code, message_format, D::default())
    }

    /// Construct with explicit captured inputs.
    pub fn with_detail(code: i32, message_format: impl Into<String>, detail: D) -> Self {
        Self {
            code,
            message_format: message_format.into(),
            detail,
            cache: OnceCell::new(),
        }
    }

    /// Failure carrying `code`.
    pub fn make_failure(code: i32, message_format: impl Into<String>) -> Self {
        Self::new(code, message_format)
    }

    /// Success with an optional informative message.
    pub fn make_success(message_format: impl Into<String>) -> Self {
        Self::new(EC_SUCCESS, message_format)
    }

    /// `code == EC_SUCCESS`.
    pub fn is_success(&self) -> bool {
        self.code == EC_SUCCESS
    }

    /// Negation of [`Self::is_success`].
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Error code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Replace the error code.
    pub fn set_code(&mut self, code: i32) {
        self.code = code;
        self.invalidate();
    }

    /// Whether a template is set.
    pub fn has_message_format(&self) -> bool {
        !self.message_format.is_empty()
    }

    /// Unrendered template.
    pub fn message_format(&self) -> &str {
        &self.message_format
    }

    /// Replace the template.
    pub fn set_message_format(&mut self, message_format: impl Into<String>) {
        self.message_format = message_format.into();
        self.invalidate();
    }

    /// Remove the template.
    pub fn clear_message_format(&mut self) {
        self.message_format.clear();
        self.invalidate();
    }

    /// Whether a rendered message is available or can be rendered.
    pub fn has_message(&self) -> bool {
        self.cache.get().is_some_and(|m| !m.is_empty()) || self.has_message_format()
    }

    /// Render the template without touching the cache.
    pub fn render(&self) -> String {
        if !self.has_message_format() {
            return String::new();
        }
        self.detail.build_message(self.code, &self.message_format)
    }

    /// Rendered message, computed on first call and cached.
    pub fn message(&self) -> &str {
        self.cache.get_or_init(|| self.render())
    }

    /// Drop the cached rendering.
    pub fn invalidate(&mut self) {
        self.cache.take();
    }

    /// Captured rendering inputs.
    pub fn detail(&self) -> &D {
        &self.detail
    }

    /// Mutable access to the rendering inputs. Invalidates the cache.
    pub fn detail_mut(&mut self) -> &mut D {
        self.invalidate();
        &mut self.detail
    }

    /// Back to a generic failure with no template and default inputs.
    pub fn reset(&mut self) {
        self.code = EC_GENERIC_FAILURE;
        self.message_format.clear();
        self.detail = D::default();
        self.invalidate();
    }
}

impl<D: RenderMessage> TypeIdentified for DomainError<D> {
    const TYPE_ID: &'static str = D::TYPE_ID;
    const WIRE_TYPE_ID: &'static str = D::WIRE_TYPE_ID;
}

impl<D: RenderMessage> fmt::Display for DomainError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[code={}]", self.code)?;
        if self.has_message() {
            write!(f, " {}", self.message())?;
        }
        Ok(())
    }
}

impl<D: RenderMessage> TreeDump for DomainError<D> {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        writeln!(out, "{indent}{}Code : [{}]", dump::TAG, self.code)?;
        writeln!(
            out,
            "{indent}{}Message format : '{}'",
            dump::TAG,
            self.message_format
        )?;
        self.detail.dump_detail(out, indent)?;
        writeln!(
            out,
            "{indent}{}Message : {}",
            dump::inherit_tag(inherit),
            dump::quoted_or_none(&self.render())
        )
    }
}

/// Template used verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plain {}

impl RenderMessage for Plain {
    const TYPE_ID: &'static str = "vire::utility::base_error";
    const WIRE_TYPE_ID: &'static str = "vire.utility.BaseError";

    fn build_message(&self, _code: i32, format: &str) -> String {
        format.to_owned()
    }
}

/// Inputs of an invalid setup name (`%n`) or version (`%v`) report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidSetupId {
    /// Rejected setup name.
    #[serde(default)]
    pub invalid_setup_name: String,
    /// Rejected setup version representation.
    #[serde(default)]
    pub invalid_setup_version: String,
}

/// Invalid setup name or version.
pub type InvalidSetupIdError = DomainError<InvalidSetupId>;

impl RenderMessage for InvalidSetupId {
    const TYPE_ID: &'static str = "vire::utility::invalid_setup_id_error";
    const WIRE_TYPE_ID: &'static str = "vire.utility.InvalidSetupIdError";

    fn build_message(&self, _code: i32, format: &str) -> String {
        if !self.invalid_setup_name.is_empty() {
            format.replace("%n", &self.invalid_setup_name)
        } else if !self.invalid_setup_version.is_empty() {
            format.replace("%v", &self.invalid_setup_version)
        } else {
            format.to_owned()
        }
    }

    fn dump_detail(&self, out: &mut dyn fmt::Write, indent: &str) -> fmt::Result {
        writeln!(
            out,
            "{indent}{}Invalid setup name : '{}'",
            dump::TAG,
            self.invalid_setup_name
        )?;
        writeln!(
            out,
            "{indent}{}Invalid setup version : '{}'",
            dump::TAG,
            self.invalid_setup_version
        )
    }
}

impl DomainError<InvalidSetupId> {
    /// The setup name was rejected.
    pub const EC_INVALID_NAME: i32 = EC_MAXIMUM_SYSTEM + 1;
    /// The setup version was rejected.
    pub const EC_INVALID_VERSION: i32 = Self::EC_INVALID_NAME + 1;

    /// Report `name` as an invalid setup name.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        let mut error = Self::default();
        error.set_invalid_setup_name(name);
        error
    }

    /// Report `version` as an invalid setup version.
    pub fn invalid_version(version: impl Into<String>) -> Self {
        let mut error = Self::default();
        error.set_invalid_setup_version(version);
        error
    }

    /// Capture an invalid setup name, keeping any custom template.
    pub fn set_invalid_setup_name(&mut self, name: impl Into<String>) {
        if !self.has_message_format() {
            self.set_message_format("Invalid setup name='%n'");
        }
        self.set_code(Self::EC_INVALID_NAME);
        let detail = self.detail_mut();
        detail.invalid_setup_version.clear();
        detail.invalid_setup_name = name.into();
    }

    /// Capture an invalid setup version, keeping any custom template.
    pub fn set_invalid_setup_version(&mut self, version: impl Into<String>) {
        if !self.has_message_format() {
            self.set_message_format("Invalid setup version=[%v]");
        }
        self.set_code(Self::EC_INVALID_VERSION);
        let detail = self.detail_mut();
        detail.invalid_setup_name.clear();
        detail.invalid_setup_version = version.into();
    }
}

/// Inputs of an unsupported payload type (`%n`) or type version (`%v`) report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedPayload {
    /// Unsupported payload type identifier.
    #[serde(default)]
    pub type_id: String,
    /// Unsupported payload type version.
    #[serde(default)]
    pub type_version: String,
}

/// Payload type or version not supported by the receiver.
pub type UnsupportedPayloadError = DomainError<UnsupportedPayload>;

impl RenderMessage for UnsupportedPayload {
    const TYPE_ID: &'static str = "vire::utility::unsupported_payload_error";
    const WIRE_TYPE_ID: &'static str = "vire.utility.UnsupportedPayloadError";

    fn build_message(&self, _code: i32, format: &str) -> String {
        format
            .replace("%n", &self.type_id)
            .replace("%v", &self.type_version)
    }

    fn dump_detail(&self, out: &mut dyn fmt::Write, indent: &str) -> fmt::Result {
        writeln!(out, "{indent}{}Type id : '{}'", dump::TAG, self.type_id)?;
        writeln!(
            out,
            "{indent}{}Type version : '{}'",
            dump::TAG,
            self.type_version
        )
    }
}

impl DomainError<UnsupportedPayload> {
    /// The payload type identifier is unknown.
    pub const EC_PAYLOAD_TYPE_ID: i32 = EC_MAXIMUM_SYSTEM + 1;
    /// The payload type is known but not in this version.
    pub const EC_PAYLOAD_TYPE_VERSION: i32 = Self::EC_PAYLOAD_TYPE_ID + 1;

    /// Report an unknown payload type.
    pub fn unsupported_type(type_id: impl Into<String>) -> Self {
        Self::with_detail(
            Self::EC_PAYLOAD_TYPE_ID,
            "Invalid payload type ID='%n'",
            UnsupportedPayload {
                type_id: type_id.into(),
                type_version: String::new(),
            },
        )
    }

    /// Report an unsupported version of a known payload type.
    pub fn unsupported_version(type_id: impl Into<String>, type_version: impl Into<String>) -> Self {
        Self::with_detail(
            Self::EC_PAYLOAD_TYPE_VERSION,
            "Invalid payload type version=[%v] for '%n'",
            UnsupportedPayload {
                type_id: type_id.into(),
                type_version: type_version.into(),
            },
        )
    }
}

/// Inputs of a method argument report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentFault {
    /// Expected number of arguments (`%e`).
    #[serde(default)]
    pub expected_nargs: usize,
    /// Received number of arguments (`%i`).
    #[serde(default)]
    pub invalid_nargs: usize,
    /// Offending argument name (`%a`).
    #[serde(default)]
    pub argument_name: String,
    /// Offending value representation (`%v`).
    #[serde(default)]
    pub invalid_value_repr: String,
}

/// Bad arguments for a resource execution.
pub type ArgumentError = DomainError<ArgumentFault>;

impl RenderMessage for ArgumentFault {
    const TYPE_ID: &'static str = "vire::cms::argument_error";
    const WIRE_TYPE_ID: &'static str = "vire.cms.ArgumentError";

    fn build_message(&self, code: i32, format: &str) -> String {
        match code {
            c if c == ArgumentError::EC_INVALID_NARGS => format
                .replace("%i", &self.invalid_nargs.to_string())
                .replace("%e", &self.expected_nargs.to_string()),
            c if c == ArgumentError::EC_INVALID_ARG => format.replace("%a", &self.argument_name),
            c if c == ArgumentError::EC_INVALID_ARG_VALUE => format
                .replace("%a", &self.argument_name)
                .replace("%v", &self.invalid_value_repr),
            _ => format.to_owned(),
        }
    }

    fn dump_detail(&self, out: &mut dyn fmt::Write, indent: &str) -> fmt::Result {
        writeln!(
            out,
            "{indent}{}Arguments : [{}/{}]",
            dump::TAG,
            self.invalid_nargs,
            self.expected_nargs
        )?;
        writeln!(
            out,
            "{indent}{}Argument name : {}",
            dump::TAG,
            dump::quoted_or_none(&self.argument_name)
        )?;
        writeln!(
            out,
            "{indent}{}Invalid value : {}",
            dump::TAG,
            dump::quoted_or_none(&self.invalid_value_repr)
        )
    }
}

impl DomainError<ArgumentFault> {
    /// Wrong number of arguments.
    pub const EC_INVALID_NARGS: i32 = EC_MAXIMUM_SYSTEM + 1;
    /// Unknown or forbidden argument.
    pub const EC_INVALID_ARG: i32 = Self::EC_INVALID_NARGS + 1;
    /// Argument value rejected.
    pub const EC_INVALID_ARG_VALUE: i32 = Self::EC_INVALID_ARG + 1;

    /// `invalid` arguments were given where `expected` were required.
    pub fn invalid_number_of_arguments(expected: usize, invalid: usize) -> Self {
        Self::with_detail(
            Self::EC_INVALID_NARGS,
            "Number of arguments [%i] does not match expected [%e]",
            ArgumentFault {
                expected_nargs: expected,
                invalid_nargs: invalid,
                ..ArgumentFault::default()
            },
        )
    }

    /// Argument `name` is not accepted.
    pub fn invalid_argument(name: impl Into<String>) -> Self {
        Self::with_detail(
            Self::EC_INVALID_ARG,
            "Invalid argument '%a'",
            ArgumentFault {
                argument_name: name.into(),
                ..ArgumentFault::default()
            },
        )
    }

    /// Value `value_repr` is not accepted for argument `name`.
    pub fn invalid_argument_value(name: impl Into<String>, value_repr: impl Into<String>) -> Self {
        Self::with_detail(
            Self::EC_INVALID_ARG_VALUE,
            "Invalid value '%v' for argument '%a'",
            ArgumentFault {
                argument_name: name.into(),
                invalid_value_repr: value_repr.into(),
                ..ArgumentFault::default()
            },
        )
    }
}

/// Inputs of a resource execution report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceExecFault {
    /// Deadline that expired (`%d`), for timeouts.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Execution of a resource method failed.
pub type ResourceExecError = DomainError<ResourceExecFault>;

impl RenderMessage for ResourceExecFault {
    const TYPE_ID: &'static str = "vire::cms::resource_exec_error";
    const WIRE_TYPE_ID: &'static str = "vire.cms.ResourceExecError";

    fn build_message(&self, code: i32, format: &str) -> String {
        match (code, &self.deadline) {
            (c, Some(deadline)) if c == ResourceExecError::EC_TIMEOUT => {
                format.replace("%d", &vire_common::time::format_timestamp(deadline))
            }
            _ => format.to_owned(),
        }
    }

    fn dump_detail(&self, out: &mut dyn fmt::Write, indent: &str) -> fmt::Result {
        writeln!(
            out,
            "{indent}{}Deadline : {}",
            dump::TAG,
            vire_common::time::format_optional(self.deadline.as_ref())
        )
    }
}

impl DomainError<ResourceExecFault> {
    /// The execution context was not usable.
    pub const EC_INVALID_EXEC_CONTEXT: i32 = EC_MAXIMUM_SYSTEM + 1;
    /// The execution did not complete before its deadline.
    pub const EC_TIMEOUT: i32 = Self::EC_INVALID_EXEC_CONTEXT + 1;

    /// Invalid execution context, described by `what` when non-empty.
    pub fn invalid_context(what: impl Into<String>) -> Self {
        let what = what.into();
        let format = if what.is_empty() {
            "Invalid execution context".to_owned()
        } else {
            what
        };
        Self::new(Self::EC_INVALID_EXEC_CONTEXT, format)
    }

    /// Execution timed out at `deadline`.
    pub fn timeout(deadline: DateTime<Utc>) -> Self {
        Self::with_detail(
            Self::EC_TIMEOUT,
            "Deadline [%d] was reached",
            ResourceExecFault {
                deadline: Some(deadline),
            },
        )
    }

    /// Whether this reports an invalid execution context.
    pub fn is_invalid_context_error(&self) -> bool {
        self.code() == Self::EC_INVALID_EXEC_CONTEXT
    }

    /// Whether this reports a timeout.
    pub fn is_timeout_error(&self) -> bool {
        self.code() == Self::EC_TIMEOUT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn failure_renders_once_and_stays_cached() {
        let error = BaseError::make_failure(42, "boom");
        assert!(error.is_failure());
        assert_eq!(error.code(), 42);
        assert_eq!(error.message(), "boom");
        let first = error.message().as_ptr();
        assert_eq!(error.message().as_ptr(), first);
        assert_eq!(error.to_string(), "[code=42] boom");
    }

    #[test]
    fn success_is_code_zero() {
        let ok = BaseError::make_success("");
        assert!(ok.is_success());
        assert!(!ok.has_message());
        assert_eq!(ok.to_string(), "[code=0]");
        assert!(BaseError::default().is_failure());
    }

    #[test]
    fn template_change_invalidates_cache() {
        let mut error = InvalidSetupIdError::invalid_name("foo");
        assert_eq!(error.message(), "Invalid setup name='foo'");
        error.set_message_format("Setup '%n' is unknown");
        assert_eq!(error.message(), "Setup 'foo' is unknown");
        error.detail_mut().invalid_setup_name = "bar".into();
        assert_eq!(error.message(), "Setup 'bar' is unknown");
    }

    #[test]
    fn setup_version_replaces_setup_name() {
        let mut error = InvalidSetupIdError::invalid_name("foo");
        error.clear_message_format();
        error.set_invalid_setup_version("9.9");
        assert_eq!(error.code(), InvalidSetupIdError::EC_INVALID_VERSION);
        assert!(error.detail().invalid_setup_name.is_empty());
        assert_eq!(error.message(), "Invalid setup version=[9.9]");
    }

    #[test]
    fn application_codes_start_after_system_range() {
        assert_eq!(InvalidSetupIdError::EC_INVALID_NAME, 100);
        assert_eq!(UnsupportedPayloadError::EC_PAYLOAD_TYPE_VERSION, 101);
        assert_eq!(ArgumentError::EC_INVALID_ARG_VALUE, 102);
        assert_eq!(ResourceExecError::EC_TIMEOUT, 101);
    }

    #[test]
    fn argument_errors_substitute_their_tokens() {
        assert_eq!(
            ArgumentError::invalid_number_of_arguments(2, 3).message(),
            "Number of arguments [3] does not match expected [2]"
        );
        assert_eq!(
            ArgumentError::invalid_argument_value("value", "-1 V").message(),
            "Invalid value '-1 V' for argument 'value'"
        );
    }

    #[test]
    fn timeout_renders_deadline() {
        let deadline = Utc
            .with_ymd_and_hms(2017, 3, 1, 8, 0, 0)
            .single()
            .expect("valid date");
        let error = ResourceExecError::timeout(deadline);
        assert!(error.is_timeout_error());
        assert_eq!(
            error.message(),
            "Deadline [2017-03-01T08:00:00.000000Z] was reached"
        );
        assert!(ResourceExecError::invalid_context("").is_invalid_context_error());
    }

    #[test]
    fn reset_restores_generic_failure() {
        let mut error = UnsupportedPayloadError::unsupported_type("vire::foo");
        error.reset();
        assert_eq!(error.code(), EC_GENERIC_FAILURE);
        assert_eq!(error.message(), "");
        assert_eq!(error.detail(), &UnsupportedPayload::default());
    }

    #[test]
    fn cache_is_not_serialized() {
        let error = InvalidSetupIdError::invalid_name("foo");
        let _ = error.message();
        let json = serde_json::to_value(&error).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "code": 100,
                "message_format": "Invalid setup name='%n'",
                "detail": {"invalid_setup_name": "foo", "invalid_setup_version": ""}
            })
        );
        let back: InvalidSetupIdError = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, error);
        assert_eq!(back.message(), "Invalid setup name='foo'");
    }
}
