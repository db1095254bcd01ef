//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message envelope model and payload classification."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Tree-formatted diagnostic output shared by every envelope entity.
//!
//! ```text
//! Message header:
//! |-- Message ID : vire.client.0[23]
//! |-- Metadata : [2]
//! |   |-- Metadata = test=John
//! |   `-- Metadata = test1=Foo
//! `-- Validity : true
//! ```
use std::fmt::{self, Write};

/// Branch to a non-last sibling.
pub const TAG: &str = "|-- ";
/// Continuation under a non-last sibling.
pub const SKIP_TAG: &str = "|   ";
/// Branch to the last sibling.
pub const LAST_TAG: &str = "`-- ";
/// Continuation under the last sibling.
pub const LAST_SKIP_TAG: &str = "    ";

/// Branch glyph for an entity's final line: `inherit` means more lines
/// follow from an enclosing dump.
pub fn inherit_tag(inherit: bool) -> &'static str {
    if inherit {
        TAG
    } else {
        LAST_TAG
    }
}

/// Continuation glyph matching [`inherit_tag`].
pub fn inherit_skip_tag(inherit: bool) -> &'static str {
    if inherit {
        SKIP_TAG
    } else {
        LAST_SKIP_TAG
    }
}

/// Human-readable structured dump. Diagnostic only, not a wire contract.
pub trait TreeDump {
    /// Write the tree into `out`, each line prefixed by `indent`.
    fn tree_dump(
        &self,
        out: &mut dyn Write,
        title: &str,
        indent: &str,
        inherit: bool,
    ) -> fmt::Result;

    /// Render the tree into a fresh string.
    fn to_tree_string(&self, title: &str) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.tree_dump(&mut out, title, "", false);
        out
    }
}

/// Write the optional title line.
pub(crate) fn write_title(out: &mut dyn Write, title: &str, indent: &str) -> fmt::Result {
    if !title.is_empty() {
        writeln!(out, "{indent}{title}")?;
    }
    Ok(())
}

/// `'value'` or `<none>` for an empty string.
pub(crate) fn quoted_or_none(value: &str) -> String {
    if value.is_empty() {
        "<none>".to_owned()
    } else {
        format!("'{value}'")
    }
}

/// Write one child line per item, switching to the last-sibling glyph at the end.
pub(crate) fn write_items<I, T>(
    out: &mut dyn Write,
    prefix: &str,
    label: &str,
    items: I,
) -> fmt::Result
where
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
    T: fmt::Display,
{
    let items = items.into_iter();
    let count = items.len();
    for (index, item) in items.enumerate() {
        let tag = if index + 1 == count { LAST_TAG } else { TAG };
        writeln!(out, "{prefix}{tag}{label} = {item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf;

    impl TreeDump for Leaf {
        fn tree_dump(
            &self,
            out: &mut dyn Write,
            title: &str,
            indent: &str,
            inherit: bool,
        ) -> fmt::Result {
            write_title(out, title, indent)?;
            writeln!(out, "{indent}{TAG}First : 1")?;
            write_items(out, &format!("{indent}{SKIP_TAG}"), "Item", ["a", "b"])?;
            writeln!(out, "{indent}{}Last : 2", inherit_tag(inherit))
        }
    }

    #[test]
    fn glyphs_follow_sibling_position() {
        let dump = Leaf.to_tree_string("Leaf:");
        assert_eq!(
            dump,
            "Leaf:\n|-- First : 1\n|   |-- Item = a\n|   `-- Item = b\n`-- Last : 2\n"
        );
    }

    #[test]
    fn inherit_keeps_branch_open() {
        let mut out = String::new();
        Leaf.tree_dump(&mut out, "", ">", true).expect("dump");
        assert!(out.ends_with(">|-- Last : 2\n"));
        assert_eq!(inherit_skip_tag(false), LAST_SKIP_TAG);
    }
}
