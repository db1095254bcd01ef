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

use super::argument::{ArgumentList, MethodArgument};
use crate::dump::{self, TreeDump};
use crate::{Result, TypeIdentified};

/// Request to execute the method exposed at a resource path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceExecRequest {
    #[serde(default)]
    path: String,
    #[serde(default)]
    input_arguments: ArgumentList,
}

impl ResourceExecRequest {
    /// Request targeting `path`, without arguments.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            input_arguments: ArgumentList::default(),
        }
    }

    /// Target resource path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether a target path is set.
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Replace the target path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Append an input argument. Fails on an invalid or duplicate name.
    pub fn add_input_argument(
        &mut self,
        name: impl Into<String>,
        value_repr: impl Into<String>,
    ) -> Result<()> {
        self.input_arguments
            .push(MethodArgument::new(name, value_repr)?)
    }

    /// Append an input argument carrying meta information.
    pub fn add_input_argument_with_meta(
        &mut self,
        name: impl Into<String>,
        value_repr: impl Into<String>,
        meta: impl Into<String>,
    ) -> Result<()> {
        self.input_arguments
            .push(MethodArgument::with_meta(name, value_repr, meta)?)
    }

    /// Whether an input argument named `name` exists.
    pub fn has_input_argument(&self, name: &str) -> bool {
        self.input_arguments.contains(name)
    }

    /// Input argument named `name`.
    pub fn input_argument(&self, name: &str) -> Result<&MethodArgument> {
        self.input_arguments.get(name)
    }

    /// Input argument at insertion position `index`.
    pub fn input_argument_at(&self, index: usize) -> Option<&MethodArgument> {
        self.input_arguments.get_at(index)
    }

    /// Number of input arguments.
    pub fn number_of_input_arguments(&self) -> usize {
        self.input_arguments.len()
    }

    /// Input arguments in insertion order.
    pub fn input_arguments(&self) -> &ArgumentList {
        &self.input_arguments
    }

    /// Remove every input argument.
    pub fn clear_input_arguments(&mut self) {
        self.input_arguments.clear();
    }

    /// Empty path and no arguments.
    pub fn reset(&mut self) {
        self.path.clear();
        self.clear_input_arguments();
    }
}

impl TypeIdentified for ResourceExecRequest {
    const TYPE_ID: &'static str = "vire::cms::resource_exec_request";
    const WIRE_TYPE_ID: &'static str = "vire.cms.ResourceExecRequest";
}

impl TreeDump for ResourceExecRequest {
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
        self.input_arguments
            .dump_section(out, indent, "Input argument", inherit)
    }
}
