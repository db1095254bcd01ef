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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dump::{self, TreeDump};
use crate::TypeIdentified;

/// Snapshot of a resource's status flags at a given time.
///
/// The four flags are independent; any combination is legal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceStatusRecord {
    #[serde(default)]
    path: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    failed: bool,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    pending: bool,
}

impl ResourceStatusRecord {
    /// Flag bit of [`Self::is_missing`].
    pub const MISSING_BIT: u16 = 1 << 0;
    /// Flag bit of [`Self::is_failed`].
    pub const FAILED_BIT: u16 = 1 << 1;
    /// Flag bit of [`Self::is_pending`].
    pub const PENDING_BIT: u16 = 1 << 2;
    /// Flag bit of [`Self::is_disabled`].
    pub const DISABLED_BIT: u16 = 1 << 3;

    /// Record for `path` at `timestamp` with every flag cleared.
    pub fn new(path: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    /// Whether a resource path is set.
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Resource path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Replace the resource path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Whether the record time is set.
    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }

    /// Record time.
    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        self.timestamp.as_ref()
    }

    /// Replace the record time.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = Some(timestamp);
    }

    /// Resource is not reachable.
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// Resource reported a failure.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Resource is administratively disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// An operation on the resource is in progress.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Set or clear the missing flag.
    pub fn set_missing(&mut self, missing: bool) {
        self.missing = missing;
    }

    /// Set or clear the failed flag.
    pub fn set_failed(&mut self, failed: bool) {
        self.failed = failed;
    }

    /// Set or clear the disabled flag.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Set or clear the pending flag.
    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    /// Packed flag word, see the `*_BIT` constants.
    pub fn flags(&self) -> u16 {
        [
            (self.missing, Self::MISSING_BIT),
            (self.failed, Self::FAILED_BIT),
            (self.pending, Self::PENDING_BIT),
            (self.disabled, Self::DISABLED_BIT),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(0, |flags, (_, bit)| flags | bit)
    }

    /// Replace all four flags from a packed word; unknown bits are ignored.
    pub fn set_flags(&mut self, flags: u16) {
        self.missing = flags & Self::MISSING_BIT != 0;
        self.failed = flags & Self::FAILED_BIT != 0;
        self.pending = flags & Self::PENDING_BIT != 0;
        self.disabled = flags & Self::DISABLED_BIT != 0;
    }

    /// Clear every flag, keeping path and timestamp.
    pub fn unset_all(&mut self) {
        self.set_flags(0);
    }

    /// Valid once both path and timestamp are set.
    pub fn is_valid(&self) -> bool {
        self.has_path() && self.has_timestamp()
    }

    /// Back to an empty, invalid record.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl TypeIdentified for ResourceStatusRecord {
    const TYPE_ID: &'static str = "vire::cms::resource_status_record";
    const WIRE_TYPE_ID: &'static str = "vire.cms.ResourceStatusRecord";
}

impl fmt::Display for ResourceStatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{};{};{};{};{};{}]",
            self.path,
            vire_common::time::format_optional(self.timestamp.as_ref()),
            self.missing,
            self.failed,
            self.disabled,
            self.pending
        )
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "<yes>"
    } else {
        "<no>"
    }
}

impl TreeDump for ResourceStatusRecord {
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
            "{indent}{}Path : {}",
            dump::TAG,
            dump::quoted_or_none(&self.path)
        )?;
        writeln!(
            out,
            "{indent}{}Timestamp : {}",
            dump::TAG,
            vire_common::time::format_optional(self.timestamp.as_ref())
        )?;
        writeln!(out, "{indent}{}Flags :", dump::TAG)?;
        let flags = [
            ("Missing ", self.missing),
            ("Failed  ", self.failed),
            ("Pending ", self.pending),
            ("Disabled", self.disabled),
        ];
        for (index, (label, set)) in flags.iter().enumerate() {
            let tag = if index + 1 == flags.len() {
                dump::LAST_TAG
            } else {
                dump::TAG
            };
            writeln!(
                out,
                "{indent}{}{tag}{label} : {}",
                dump::SKIP_TAG,
                yes_no(*set)
            )?;
        }
        writeln!(
            out,
            "{indent}{}Validity : {}",
            dump::inherit_tag(inherit),
            yes_no(self.is_valid())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_only_record_is_valid() {
        let mut record = ResourceStatusRecord::new("R/Voltage/read", Utc::now());
        record.set_pending(true);
        assert!(record.is_valid());
        assert!(record.is_pending());
        assert!(!record.is_missing() && !record.is_failed() && !record.is_disabled());
        assert_eq!(record.flags(), ResourceStatusRecord::PENDING_BIT);
    }

    #[test]
    fn flags_are_independent() {
        let mut record = ResourceStatusRecord::default();
        record.set_flags(ResourceStatusRecord::MISSING_BIT | ResourceStatusRecord::DISABLED_BIT);
        assert!(record.is_missing() && record.is_disabled());
        assert!(!record.is_failed() && !record.is_pending());
        record.set_failed(true);
        assert_eq!(record.flags(), 0b1011);
        record.unset_all();
        assert_eq!(record.flags(), 0);
    }

    #[test]
    fn validity_needs_path_and_timestamp() {
        let mut record = ResourceStatusRecord::default();
        assert!(!record.is_valid());
        record.set_path("R/Voltage");
        assert!(!record.is_valid());
        record.set_timestamp(Utc::now());
        assert!(record.is_valid());
        record.reset();
        assert!(!record.is_valid());
    }

    #[test]
    fn display_lists_path_time_and_flags() {
        let mut record = ResourceStatusRecord::default();
        record.set_path("R/x");
        record.set_disabled(true);
        assert_eq!(record.to_string(), "[R/x;<none>;false;false;true;false]");
        let dump = record.to_tree_string("Status:");
        assert!(dump.contains("|   |-- Missing  : <no>"));
        assert!(dump.contains("|   `-- Disabled : <yes>"));
        assert!(dump.ends_with("`-- Validity : <no>\n"));
    }
}
