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

use serde::{Deserialize, Serialize};

use crate::dump::{self, TreeDump};
use crate::TypeIdentified;

/// Key/value pair attached to a message header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Metadata key.
    pub key: String,
    /// Value representation.
    pub value: String,
}

impl MetadataEntry {
    /// Construct an entry from any key and value representation.
    pub fn new(key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }

    /// Whether a key is set.
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Whether a value is set.
    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }

    /// An entry is usable once it has a key.
    pub fn is_valid(&self) -> bool {
        self.has_key()
    }
}

impl TypeIdentified for MetadataEntry {
    const TYPE_ID: &'static str = "vire::utility::metadata_record";
    const WIRE_TYPE_ID: &'static str = "vire.utility.MetadataRecord";
}

impl fmt::Display for MetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl TreeDump for MetadataEntry {
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
            "{indent}{}Key : {}",
            dump::TAG,
            dump::quoted_or_none(&self.key)
        )?;
        writeln!(
            out,
            "{indent}{}Value : {}",
            dump::TAG,
            dump::quoted_or_none(&self.value)
        )?;
        writeln!(
            out,
            "{indent}{}Validity : {}",
            dump::inherit_tag(inherit),
            if self.is_valid() { "<yes>" } else { "<no>" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_values_are_stored_as_text() {
        assert_eq!(MetadataEntry::new("retries", 3).value, "3");
        assert_eq!(MetadataEntry::new("ratio", 0.5).value, "0.5");
        assert_eq!(MetadataEntry::new("urgent", true).value, "true");
        assert_eq!(MetadataEntry::new("user", "John").to_string(), "user=John");
    }

    #[test]
    fn validity_requires_key_only() {
        assert!(MetadataEntry::new("empty", "").is_valid());
        assert!(!MetadataEntry::default().is_valid());
    }
}
