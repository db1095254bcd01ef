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

/// Identity of a message: emitter name plus sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageIdentifier {
    #[serde(default)]
    emitter: String,
    #[serde(default = "invalid_number")]
    number: i32,
}

fn invalid_number() -> i32 {
    MessageIdentifier::INVALID_NUMBER
}

impl Default for MessageIdentifier {
    fn default() -> Self {
        Self {
            emitter: String::new(),
            number: Self::INVALID_NUMBER,
        }
    }
}

impl MessageIdentifier {
    /// Sequence number marking an unset identifier.
    pub const INVALID_NUMBER: i32 = -1;

    /// Identifier `emitter[number]`.
    pub fn new(emitter: impl Into<String>, number: i32) -> Self {
        Self {
            emitter: emitter.into(),
            number,
        }
    }

    /// Emitter name.
    pub fn emitter(&self) -> &str {
        &self.emitter
    }

    /// Replace the emitter name.
    pub fn set_emitter(&mut self, emitter: impl Into<String>) {
        self.emitter = emitter.into();
    }

    /// Sequence number.
    pub fn number(&self) -> i32 {
        self.number
    }

    /// Replace the sequence number.
    pub fn set_number(&mut self, number: i32) {
        self.number = number;
    }

    /// Valid iff the emitter is set and the number is not the sentinel.
    pub fn is_valid(&self) -> bool {
        !self.emitter.is_empty() && self.number != Self::INVALID_NUMBER
    }

    /// Back to the invalid identifier.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl TypeIdentified for MessageIdentifier {
    const TYPE_ID: &'static str = "vire::message::message_identifier";
    const WIRE_TYPE_ID: &'static str = "vire.message.MessageIdentifier";
}

impl fmt::Display for MessageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.emitter, self.number)
    }
}

impl TreeDump for MessageIdentifier {
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
            "{indent}{}Emitter : {}",
            dump::TAG,
            dump::quoted_or_none(&self.emitter)
        )?;
        writeln!(out, "{indent}{}Number : [{}]", dump::TAG, self.number)?;
        writeln!(
            out,
            "{indent}{}Validity : {}",
            dump::inherit_tag(inherit),
            self.is_valid()
        )
    }
}
