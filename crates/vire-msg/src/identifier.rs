//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Named, optionally versioned identifiers.
//!
//! Acceptance of a name is a policy of the identifier kind
//! ([`IdentifierKind::name_is_valid`]); validity of an identifier is a pure
//! predicate over its current state ([`Identifier::is_valid`]). Model and
//! instance identifiers share the type but not the policy, so their rules can
//! evolve independently.
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dump::{self, TreeDump};
use crate::{EnvelopeError, Result, TypeIdentified};

/// Name-acceptance policy of an identifier kind.
pub trait IdentifierKind:
    Copy + fmt::Debug + Default + PartialEq + Eq + Hash + Send + Sync + 'static
{
    /// Label used in error reports.
    const LABEL: &'static str;

    /// Whether `name` may be stored. Rejects everything unless overridden.
    fn name_is_valid(name: &str) -> bool {
        let _ = name;
        false
    }
}

/// Kind of identifiers naming a type of thing (payload types, body layouts).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Model;

impl IdentifierKind for Model {
    const LABEL: &'static str = "model identifier";

    fn name_is_valid(name: &str) -> bool {
        !name.is_empty()
    }
}

/// Kind of identifiers naming one particular instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Instance;

impl IdentifierKind for Instance {
    const LABEL: &'static str = "instance identifier";

    fn name_is_valid(name: &str) -> bool {
        !name.is_empty()
    }
}

/// Identifier of a type of thing.
pub type ModelIdentifier = Identifier<Model>;
/// Identifier of a particular instance.
pub type InstanceIdentifier = Identifier<Instance>;

/// Name plus optional version, checked against the policy of `K`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Identifier<K: IdentifierKind> {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip)]
    kind: PhantomData<K>,
}

impl<K: IdentifierKind> Default for Identifier<K> {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: None,
            kind: PhantomData,
        }
    }
}

impl<K: IdentifierKind> Identifier<K> {
    /// Build an unversioned identifier.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let mut id = Self::default();
        id.set_name(name)?;
        Ok(id)
    }

    /// Build a versioned identifier.
    pub fn with_version(name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let mut id = Self::default();
        id.set(name, Some(version.into()))?;
        Ok(id)
    }

    /// Valid iff the name is non-empty and any version is non-empty.
    pub fn is_valid(&self) -> bool {
        if self.name.is_empty() {
            return false;
        }
        !matches!(self.version.as_deref(), Some(""))
    }

    /// Store `name` if the kind's policy accepts it.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if !K::name_is_valid(&name) {
            return Err(EnvelopeError::InvalidName {
                kind: K::LABEL,
                name,
            });
        }
        self.name = name;
        Ok(())
    }

    /// Identifier name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a version is attached.
    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    /// Attach a version; empty versions are rejected.
    pub fn set_version(&mut self, version: impl Into<String>) -> Result<()> {
        let version = version.into();
        if version.is_empty() {
            return Err(EnvelopeError::InvalidVersion(version));
        }
        self.version = Some(version);
        Ok(())
    }

    /// Drop any attached version.
    pub fn reset_version(&mut self) {
        self.version = None;
    }

    /// Attached version, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Replace name and version together; nothing changes on failure.
    pub fn set(&mut self, name: impl Into<String>, version: Option<String>) -> Result<()> {
        let mut candidate = Self::default();
        candidate.set_name(name)?;
        if let Some(version) = version {
            candidate.set_version(version)?;
        }
        *self = candidate;
        Ok(())
    }

    /// Name equality, plus version equality when `version` is given.
    pub fn matches(&self, name: &str, version: Option<&str>) -> bool {
        if self.name != name {
            return false;
        }
        match version {
            Some(wanted) => self.version.as_deref() == Some(wanted),
            None => true,
        }
    }

    /// Clear name and version, leaving an invalid identifier.
    pub fn reset(&mut self) {
        self.name.clear();
        self.version = None;
    }
}

impl Identifier<Model> {
    /// Identifier of a declared type id. Declared ids are never empty.
    pub(crate) fn from_type_id(type_id: &'static str) -> Self {
        Self {
            name: type_id.to_owned(),
            version: None,
            kind: PhantomData,
        }
    }
}

impl TypeIdentified for Identifier<Model> {
    const TYPE_ID: &'static str = "vire::utility::model_identifier";
    const WIRE_TYPE_ID: &'static str = "vire.utility.ModelIdentifier";
}

impl TypeIdentified for Identifier<Instance> {
    const TYPE_ID: &'static str = "vire::utility::instance_identifier";
    const WIRE_TYPE_ID: &'static str = "vire.utility.InstanceIdentifier";
}

impl<K: IdentifierKind> fmt::Display for Identifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, "-{version}")?;
        }
        Ok(())
    }
}

impl<K: IdentifierKind> FromStr for Identifier<K> {
    type Err = EnvelopeError;

    /// Parse `name` or `name-version`, splitting on the first hyphen.
    fn from_str(repr: &str) -> Result<Self> {
        match repr.split_once('-') {
            Some((name, version)) => Self::with_version(name, version),
            None => Self::new(repr),
        }
    }
}

impl<K: IdentifierKind> TreeDump for Identifier<K> {
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
            "{indent}{}Name : {}",
            dump::TAG,
            dump::quoted_or_none(&self.name)
        )?;
        writeln!(
            out,
            "{indent}{}Version : {}",
            dump::TAG,
            dump::quoted_or_none(self.version.as_deref().unwrap_or_default())
        )?;
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

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    struct Locked;

    impl IdentifierKind for Locked {
        const LABEL: &'static str = "locked identifier";
    }

    #[test]
    fn validity_follows_name() {
        let id = ModelIdentifier::new("vire::cms::resource_exec_request").expect("valid name");
        assert!(id.is_valid());
        assert!(!id.has_version());

        let err = ModelIdentifier::new("").expect_err("empty name rejected");
        assert_eq!(
            err,
            EnvelopeError::InvalidName {
                kind: "model identifier",
                name: String::new(),
            }
        );
        assert!(!ModelIdentifier::default().is_valid());
    }

    #[test]
    fn default_policy_rejects_every_name() {
        let mut id = Identifier::<Locked>::default();
        assert!(id.set_name("anything").is_err());
        assert!(!id.is_valid());
    }

    #[test]
    fn reset_always_invalidates() {
        let mut id = InstanceIdentifier::with_version("SuperNEMO", "1.0").expect("valid");
        assert!(id.is_valid());
        id.reset();
        assert!(!id.is_valid());
        assert_eq!(id.version(), None);
    }

    #[test]
    fn failed_set_keeps_previous_state() {
        let mut id = ModelIdentifier::with_version("layout", "1.0").expect("valid");
        assert!(id.set("other", Some(String::new())).is_err());
        assert_eq!(id.name(), "layout");
        assert_eq!(id.version(), Some("1.0"));
    }

    #[test]
    fn textual_form_round_trips() {
        let id: ModelIdentifier = "vire::message::body_format::typed_payload-1.0"
            .parse()
            .expect("parse");
        assert_eq!(id.name(), "vire::message::body_format::typed_payload");
        assert_eq!(id.version(), Some("1.0"));
        assert_eq!(id.to_string(), "vire::message::body_format::typed_payload-1.0");
        assert!(id.matches("vire::message::body_format::typed_payload", Some("1.0")));
        assert!(id.matches("vire::message::body_format::typed_payload", None));
        assert!(!id.matches("vire::message::body_format::typed_payload", Some("2.0")));

        assert!("-1.0".parse::<ModelIdentifier>().is_err());
        assert!("name-".parse::<ModelIdentifier>().is_err());
    }

    #[test]
    fn kinds_are_distinct_types_with_same_wire_shape() {
        let model = ModelIdentifier::with_version("setup", "2.1").expect("valid");
        let json = serde_json::to_value(&model).expect("serialize");
        assert_eq!(json, serde_json::json!({"name": "setup", "version": "2.1"}));
        let instance: InstanceIdentifier = serde_json::from_value(json).expect("deserialize");
        assert_eq!(instance.to_string(), model.to_string());
    }
}
