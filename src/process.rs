//! @ai:module:intent Host-side process model the annotations are reconciled against
//! @ai:module:layer domain
//! @ai:module:public_api ProcessInfo, ConfigRegistry, Proc, InputSpec, OutputSpec, Template, ConfigValue, ConfigField, RuntimePolicy, type_name
//! @ai:module:depends_on annotation, error
//! @ai:module:stateless false

use crate::annotation::Annotation;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Output kinds recognized in the middle of a `name:kind:template` declaration.
pub const OUTPUT_KINDS: &[&str] = &["var", "file", "path", "dir", "stdout", "stderr"];

/// Type used for inputs and outputs declared without one.
pub const DEFAULT_KIND: &str = "var";

/// @ai:intent Read-only view of a process's declarations
pub trait ProcessInfo {
    /// @ai:intent Identifier used in diagnostics
    fn id(&self) -> &str;

    /// @ai:intent Declared input keys, `name` or `name:type`
    fn input(&self) -> &InputSpec;

    /// @ai:intent Declared outputs in order
    fn output(&self) -> &IndexMap<String, OutputSpec>;

    /// @ai:intent Process arguments in order
    fn args(&self) -> &IndexMap<String, Value>;

    /// @ai:intent Process configuration in order
    fn config(&self) -> &IndexMap<String, ConfigValue>;
}

/// @ai:intent Host capability for registering configuration fields
pub trait ConfigRegistry {
    /// @ai:intent Register a field, converting any value it already holds
    fn add_config(&mut self, name: &str, field: ConfigField) -> Result<()>;
}

/// @ai:intent Runtime type name of an arbitrary value, such as `str` or `dict`
/// @ai:effects pure
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// @ai:intent Declared inputs, either a flat list of keys or keys mapped to data
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawInput")]
pub enum InputSpec {
    Names(Vec<String>),
    Keyed(IndexMap<String, Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Joined(String),
    Names(Vec<String>),
    Keyed(IndexMap<String, Value>),
}

impl From<RawInput> for InputSpec {
    fn from(raw: RawInput) -> Self {
        match raw {
            RawInput::Joined(s) => Self::from(s.as_str()),
            RawInput::Names(names) => Self::Names(names),
            RawInput::Keyed(map) => Self::Keyed(map),
        }
    }
}

impl Default for InputSpec {
    fn default() -> Self {
        Self::Names(Vec::new())
    }
}

impl From<&str> for InputSpec {
    fn from(joined: &str) -> Self {
        Self::Names(vec![joined.to_string()])
    }
}

impl InputSpec {
    /// @ai:intent Flatten declared keys, splitting comma-joined entries
    /// @ai:effects pure
    pub fn keys(&self) -> Vec<&str> {
        let raw: Vec<&str> = match self {
            Self::Names(names) => names.iter().map(String::as_str).collect(),
            Self::Keyed(map) => map.keys().map(String::as_str).collect(),
        };
        raw.into_iter()
            .flat_map(|key| key.split(','))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .collect()
    }

    /// @ai:intent Split each key into name and type, `var` when untyped
    /// @ai:effects pure
    pub fn typed_keys(&self) -> Vec<(&str, &str)> {
        self.keys()
            .into_iter()
            .map(|key| key.split_once(':').unwrap_or((key, DEFAULT_KIND)))
            .collect()
    }
}

/// @ai:intent Output template, only its source text is consulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// @ai:intent Declared output kind plus its template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub kind: String,
    pub template: Template,
}

impl OutputSpec {
    /// @ai:intent Parse `name:template` or `name:kind:template`
    /// @ai:edge_cases the middle part is a kind only if it is a known output kind
    /// @ai:effects pure
    pub fn parse(decl: &str) -> Result<(String, Self)> {
        let (name, rest) = decl
            .split_once(':')
            .ok_or_else(|| Error::InvalidOutput(format!("missing template in {:?}", decl)))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidOutput(format!("missing name in {:?}", decl)));
        }

        let (kind, template) = match rest.split_once(':') {
            Some((kind, template)) if OUTPUT_KINDS.contains(&kind) => (kind, template),
            _ => (DEFAULT_KIND, rest),
        };

        Ok((
            name.to_string(),
            Self {
                kind: kind.to_string(),
                template: Template::new(template),
            },
        ))
    }

    /// @ai:intent Parse several declarations in order
    pub fn parse_all<'a>(
        decls: impl IntoIterator<Item = &'a str>,
    ) -> Result<IndexMap<String, Self>> {
        decls.into_iter().map(Self::parse).collect()
    }
}

/// @ai:intent A configuration value, plain data or a converted annotation
#[derive(Debug, Clone)]
pub enum ConfigValue {
    Plain(Value),
    Annotation(Annotation),
}

impl ConfigValue {
    /// @ai:intent Runtime type name used when filling config option types
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Plain(value) => type_name(value),
            Self::Annotation(_) => "Annotation",
        }
    }

    /// @ai:intent Plain data view of the value
    pub fn to_value(&self) -> Value {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Annotation(annotation) => annotation.to_value(),
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            Self::Annotation(annotation) => Some(annotation),
            Self::Plain(_) => None,
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Plain(Value::String(value.to_string()))
    }
}

impl From<Annotation> for ConfigValue {
    fn from(annotation: Annotation) -> Self {
        Self::Annotation(annotation)
    }
}

/// @ai:intent Whether runtime configuration layers may override a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimePolicy {
    #[default]
    Update,
    Ignore,
}

pub type Converter = Box<dyn Fn(ConfigValue) -> Result<ConfigValue>>;

/// @ai:intent Registered configuration field with default, policy and converter
pub struct ConfigField {
    pub default: ConfigValue,
    pub runtime: RuntimePolicy,
    pub converter: Option<Converter>,
}

impl fmt::Debug for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigField")
            .field("default", &self.default)
            .field("runtime", &self.runtime)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

impl ConfigField {
    fn convert(&self, value: ConfigValue) -> Result<ConfigValue> {
        match &self.converter {
            Some(converter) => converter(value),
            None => Ok(value),
        }
    }
}

/// @ai:intent Minimal in-memory pipeline process
#[derive(Debug, Default)]
pub struct Proc {
    id: String,
    input: InputSpec,
    output: IndexMap<String, OutputSpec>,
    args: IndexMap<String, Value>,
    config: IndexMap<String, ConfigValue>,
    fields: IndexMap<String, ConfigField>,
}

impl Proc {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: impl Into<InputSpec>) -> Self {
        self.input = input.into();
        self
    }

    /// @ai:intent Add an output from a `name[:kind]:template` declaration
    pub fn with_output(mut self, decl: &str) -> Result<Self> {
        let (name, spec) = OutputSpec::parse(decl)?;
        self.output.insert(name, spec);
        Ok(self)
    }

    pub fn with_arg(mut self, name: &str, value: Value) -> Self {
        self.args.insert(name.to_string(), value);
        self
    }

    pub fn with_config(mut self, name: &str, value: impl Into<ConfigValue>) -> Self {
        self.config.insert(name.to_string(), value.into());
        self
    }

    pub fn set_input(&mut self, input: impl Into<InputSpec>) {
        self.input = input.into();
    }

    pub fn set_output(&mut self, output: IndexMap<String, OutputSpec>) {
        self.output = output;
    }

    pub fn set_arg(&mut self, name: &str, value: Value) {
        self.args.insert(name.to_string(), value);
    }

    /// @ai:intent Assign a config value, running the field converter if registered
    /// @ai:effects mutates self
    pub fn set_config(&mut self, name: &str, value: impl Into<ConfigValue>) -> Result<()> {
        let value = match self.fields.get(name) {
            Some(field) => field.convert(value.into())?,
            None => value.into(),
        };
        self.config.insert(name.to_string(), value);
        Ok(())
    }

    pub fn config_value(&self, name: &str) -> Option<&ConfigValue> {
        self.config.get(name)
    }

    /// @ai:intent The converted `annotate` field, if registered
    pub fn annotation(&self) -> Option<&Annotation> {
        self.config_value("annotate").and_then(ConfigValue::as_annotation)
    }

    /// @ai:intent Apply a runtime configuration layer
    /// @ai:post fields registered with RuntimePolicy::Ignore keep their value
    /// @ai:effects mutates self
    pub fn apply_runtime(&mut self, layer: &IndexMap<String, Value>) -> Result<()> {
        for (name, value) in layer {
            let ignored = self
                .fields
                .get(name)
                .is_some_and(|field| field.runtime == RuntimePolicy::Ignore);
            if ignored {
                tracing::debug!(process = %self.id, field = %name, "runtime override ignored");
                continue;
            }
            self.set_config(name, value.clone())?;
        }
        Ok(())
    }
}

impl ProcessInfo for Proc {
    fn id(&self) -> &str {
        &self.id
    }

    fn input(&self) -> &InputSpec {
        &self.input
    }

    fn output(&self) -> &IndexMap<String, OutputSpec> {
        &self.output
    }

    fn args(&self) -> &IndexMap<String, Value> {
        &self.args
    }

    fn config(&self) -> &IndexMap<String, ConfigValue> {
        &self.config
    }
}

impl ConfigRegistry for Proc {
    fn add_config(&mut self, name: &str, field: ConfigField) -> Result<()> {
        let current = self
            .config
            .get(name)
            .cloned()
            .unwrap_or_else(|| field.default.clone());
        let value = field.convert(current)?;
        self.config.insert(name.to_string(), value);
        self.fields.insert(name.to_string(), field);
        Ok(())
    }
}
