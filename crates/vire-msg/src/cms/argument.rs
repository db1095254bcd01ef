//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Resource execution payloads and status records."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dump::{self, TreeDump};
use crate::{EnvelopeError, Result, TypeIdentified};

/// Named argument of a resource method, value carried as text.
///
/// Decoding goes through [`MethodArgument::with_meta`], so a decoded argument
/// obeys the same name and value rules as one built locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMethodArgument")]
pub struct MethodArgument {
    name: String,
    value_repr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<String>,
}

impl MethodArgument {
    /// Argument without meta information.
    ///
    /// Names must be non-empty and contain no `.`; values must be non-empty.
    pub fn new(name: impl Into<String>, value_repr: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let value_repr = value_repr.into();
        if name.is_empty() || name.contains('.') {
            return Err(EnvelopeError::InvalidArgument(format!(
                "invalid argument name '{name}'"
            )));
        }
        if value_repr.is_empty() {
            return Err(EnvelopeError::InvalidArgument(format!(
                "empty value representation for argument '{name}'"
            )));
        }
        Ok(Self {
            name,
            value_repr,
            meta: None,
        })
    }

    /// Argument with meta information (unit, type hint...). Empty meta is dropped.
    pub fn with_meta(
        name: impl Into<String>,
        value_repr: impl Into<String>,
        meta: impl Into<String>,
    ) -> Result<Self> {
        let mut argument = Self::new(name, value_repr)?;
        let meta = meta.into();
        if !meta.is_empty() {
            argument.meta = Some(meta);
        }
        Ok(argument)
    }

    /// Argument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value representation.
    pub fn value_repr(&self) -> &str {
        &self.value_repr
    }

    /// Meta information, if any.
    pub fn meta(&self) -> Option<&str> {
        self.meta.as_deref()
    }
}

#[derive(Deserialize)]
struct RawMethodArgument {
    name: String,
    value_repr: String,
    #[serde(default)]
    meta: Option<String>,
}

impl TryFrom<RawMethodArgument> for MethodArgument {
    type Error = EnvelopeError;

    fn try_from(raw: RawMethodArgument) -> Result<Self> {
        Self::with_meta(raw.name, raw.value_repr, raw.meta.unwrap_or_default())
    }
}

impl TypeIdentified for MethodArgument {
    const TYPE_ID: &'static str = "vire::cms::method_argument";
    const WIRE_TYPE_ID: &'static str = "vire.cms.MethodArgument";
}

impl fmt::Display for MethodArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}'", self.name, self.value_repr)?;
        if let Some(meta) = &self.meta {
            write!(f, " [{meta}]")?;
        }
        Ok(())
    }
}

/// Insertion-ordered arguments with unique names.
///
/// Serialized as a plain sequence; decoding rejects repeated names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MethodArgument>")]
pub struct ArgumentList(Vec<MethodArgument>);

impl TryFrom<Vec<MethodArgument>> for ArgumentList {
    type Error = EnvelopeError;

    fn try_from(arguments: Vec<MethodArgument>) -> Result<Self> {
        let mut list = Self::default();
        for argument in arguments {
            list.push(argument)?;
        }
        Ok(list)
    }
}

impl ArgumentList {
    /// Append `argument` unless its name is already present (exact match).
    pub fn push(&mut self, argument: MethodArgument) -> Result<()> {
        if self.contains(argument.name()) {
            return Err(EnvelopeError::DuplicateArgument(argument.name));
        }
        self.0.push(argument);
        Ok(())
    }

    /// Whether an argument named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|argument| argument.name == name)
    }

    /// Argument named `name`.
    pub fn get(&self, name: &str) -> Result<&MethodArgument> {
        self.0
            .iter()
            .find(|argument| argument.name == name)
            .ok_or_else(|| EnvelopeError::MissingArgument(name.to_owned()))
    }

    /// Argument at insertion position `index`.
    pub fn get_at(&self, index: usize) -> Option<&MethodArgument> {
        self.0.get(index)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every argument.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Arguments in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, MethodArgument> {
        self.0.iter()
    }

    /// Dump as `<label> : [n]` followed by one line per argument.
    pub(crate) fn dump_section(
        &self,
        out: &mut dyn fmt::Write,
        indent: &str,
        label: &str,
        inherit: bool,
    ) -> fmt::Result {
        write!(out, "{indent}{}{label}s : ", dump::inherit_tag(inherit))?;
        if self.is_empty() {
            writeln!(out, "<none>")?;
        } else {
            writeln!(out, "[{}]", self.len())?;
        }
        dump::write_items(
            out,
            &format!("{indent}{}", dump::inherit_skip_tag(inherit)),
            label,
            self.iter(),
        )
    }
}

impl<'a> IntoIterator for &'a ArgumentList {
    type Item = &'a MethodArgument;
    type IntoIter = std::slice::Iter<'a, MethodArgument>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TreeDump for MethodArgument {
    fn tree_dump(
        &self,
        out: &mut dyn fmt::Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result {
        dump::write_title(out, title, indent)?;
        writeln!(out, "{indent}{}Name : '{}'", dump::TAG, self.name)?;
        writeln!(
            out,
            "{indent}{}Value representation : '{}'",
            dump::TAG,
            self.value_repr
        )?;
        writeln!(
            out,
            "{indent}{}Meta : {}",
            dump::inherit_tag(inherit),
            dump::quoted_or_none(self.meta.as_deref().unwrap_or_default())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_validation() {
        assert!(MethodArgument::new("value", "503.4 V").is_ok());
        assert!(matches!(
            MethodArgument::new("", "1"),
            Err(EnvelopeError::InvalidArgument(_))
        ));
        assert!(MethodArgument::new("a.b", "1").is_err());
        assert!(MethodArgument::new("value", "").is_err());
        let with_meta = MethodArgument::with_meta("value", "1", "unit=V").expect("valid");
        assert_eq!(with_meta.meta(), Some("unit=V"));
        assert_eq!(with_meta.to_string(), "value='1' [unit=V]");
        assert_eq!(MethodArgument::with_meta("v", "1", "").expect("valid").meta(), None);
    }

    #[test]
    fn list_keeps_order_and_rejects_duplicates() {
        let mut list = ArgumentList::default();
        list.push(MethodArgument::new("b", "2").expect("valid"))
            .expect("first");
        list.push(MethodArgument::new("a", "1").expect("valid"))
            .expect("second");
        let err = list
            .push(MethodArgument::new("b", "3").expect("valid"))
            .expect_err("duplicate");
        assert_eq!(err, EnvelopeError::DuplicateArgument("b".into()));
        assert_eq!(list.len(), 2);
        let names: Vec<_> = list.iter().map(MethodArgument::name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(list.get("b").expect("present").value_repr(), "2");
        assert!(list.push(MethodArgument::new("B", "4").expect("valid")).is_ok());
        assert_eq!(
            list.get("c").expect_err("absent"),
            EnvelopeError::MissingArgument("c".into())
        );
    }

    #[test]
    fn decoding_applies_construction_rules() {
        let list: ArgumentList = serde_json::from_value(serde_json::json!([
            {"name": "value", "value_repr": "503.4 V", "meta": "unit=V"},
            {"name": "dummy", "value_repr": "1"}
        ]))
        .expect("valid list");
        assert_eq!(list.len(), 2);
        assert_eq!(list.get("value").expect("present").meta(), Some("unit=V"));
        assert_eq!(
            serde_json::to_value(&list).expect("serialize"),
            serde_json::json!([
                {"name": "value", "value_repr": "503.4 V", "meta": "unit=V"},
                {"name": "dummy", "value_repr": "1"}
            ])
        );

        let duplicate = serde_json::from_value::<ArgumentList>(serde_json::json!([
            {"name": "value", "value_repr": "503.4 V"},
            {"name": "value", "value_repr": "0 V"}
        ]))
        .expect_err("duplicate name");
        assert!(duplicate.to_string().contains("already exists"));

        for bad in [
            serde_json::json!({"name": "a.b", "value_repr": "1"}),
            serde_json::json!({"name": "", "value_repr": "1"}),
            serde_json::json!({"name": "value", "value_repr": ""}),
        ] {
            assert!(serde_json::from_value::<MethodArgument>(bad).is_err());
        }
    }
}
