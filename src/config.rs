//! @ai:module:intent TOML documents describing processes and runtime configuration layers
//! @ai:module:layer infrastructure
//! @ai:module:public_api ProcessFile, RuntimeConfig, OutputDecl
//! @ai:module:depends_on process, hook, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::hook::{proc_init, ANNOTATE_FIELD};
use crate::process::{InputSpec, OutputSpec, Proc};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// @ai:intent Output declarations, one joined string or a list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OutputDecl {
    One(String),
    Many(Vec<String>),
}

impl Default for OutputDecl {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl OutputDecl {
    /// @ai:intent Individual `name[:kind]:template` declarations
    pub fn decls(&self) -> Vec<&str> {
        match self {
            Self::One(decl) => vec![decl.as_str()],
            Self::Many(decls) => decls.iter().map(String::as_str).collect(),
        }
    }
}

/// @ai:intent A process definition with its annotation text
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessFile {
    pub id: String,
    #[serde(default)]
    pub input: InputSpec,
    #[serde(default)]
    pub output: OutputDecl,
    #[serde(default)]
    pub args: IndexMap<String, Value>,
    #[serde(default)]
    pub config: IndexMap<String, Value>,
    #[serde(default)]
    pub annotate: String,
}

impl ProcessFile {
    /// @ai:intent Load a process definition from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// @ai:intent Parse a process definition from TOML text
    /// @ai:effects pure
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// @ai:intent Build the process with the annotate field installed
    /// @ai:post the annotation text is converted by the hook converter
    pub fn into_proc(self) -> Result<Rc<RefCell<Proc>>> {
        let output = OutputSpec::parse_all(self.output.decls())?;

        let mut proc = Proc::new(self.id).with_input(self.input);
        proc.set_output(output);
        for (name, value) in self.args {
            proc.set_arg(&name, value);
        }
        for (name, value) in self.config {
            proc = proc.with_config(&name, value);
        }
        proc = proc.with_config(ANNOTATE_FIELD, self.annotate.as_str());

        let process = Rc::new(RefCell::new(proc));
        proc_init(&process)?;
        Ok(process)
    }
}

/// @ai:intent Runtime layer applied on top of process configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub config: IndexMap<String, Value>,
}

impl RuntimeConfig {
    /// @ai:intent Load a runtime layer from a TOML file
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// @ai:intent Apply this layer to a process
    /// @ai:effects mutates process config
    pub fn apply(&self, process: &Rc<RefCell<Proc>>) -> Result<()> {
        process.borrow_mut().apply_runtime(&self.config)
    }
}
