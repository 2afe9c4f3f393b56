//! @ai:module:intent Data structures for parsed annotations and the per-process annotation facade
//! @ai:module:layer domain
//! @ai:module:public_api Annotation, Formatter, OptionEntry, OptionMap, SectionMap, ProcessHandle
//! @ai:module:depends_on sections, enrich, process, error
//! @ai:module:stateless false

use crate::enrich;
use crate::error::{Error, Result};
use crate::process::ProcessInfo;
use crate::sections::{dedent, split_sections, DESCRIPTION};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

/// Ordered section name to dedented body text.
pub type SectionMap = IndexMap<String, String>;

/// Ordered option name to entry, scoped to one section parse.
pub type OptionMap = IndexMap<String, OptionEntry>;

/// Non-owning handle to the process an annotation documents.
pub type ProcessHandle = Weak<RefCell<dyn ProcessInfo>>;

/// @ai:intent One documented option within a section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    #[serde(rename = "type")]
    pub ty: String,
    pub desc: String,
    /// `None` when no default was annotated
    pub default: Option<Value>,
}

impl OptionEntry {
    /// @ai:intent Create an entry with every field given
    pub fn new(ty: impl Into<String>, desc: impl Into<String>, default: Option<Value>) -> Self {
        Self {
            ty: ty.into(),
            desc: desc.into(),
            default,
        }
    }

    /// @ai:intent Check if the type is still unset
    pub fn has_blank_type(&self) -> bool {
        self.ty.is_empty()
    }

    /// @ai:intent Check if the default is unset or an empty string
    pub fn has_blank_default(&self) -> bool {
        match &self.default {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }
}

/// A section formatter, either text-only or also reading the process.
pub enum Formatter<T> {
    Text(Box<dyn Fn(&str) -> Result<T>>),
    WithProcess(Box<dyn Fn(&str, &dyn ProcessInfo) -> Result<T>>),
}

impl<T> Formatter<T> {
    /// @ai:intent Wrap a formatter that only needs the section text
    pub fn text(f: impl Fn(&str) -> Result<T> + 'static) -> Self {
        Self::Text(Box::new(f))
    }

    /// @ai:intent Wrap a formatter that also reads the process object
    pub fn with_process(f: impl Fn(&str, &dyn ProcessInfo) -> Result<T> + 'static) -> Self {
        Self::WithProcess(Box::new(f))
    }
}

impl<T> fmt::Debug for Formatter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Formatter::Text"),
            Self::WithProcess(_) => f.write_str("Formatter::WithProcess"),
        }
    }
}

/// @ai:intent Parsed annotation of one process, enriched lazily on access
/// @ai:invariant sections are split once; option sections are re-parsed on every access
#[derive(Debug, Clone)]
pub struct Annotation {
    sections: SectionMap,
    process: ProcessHandle,
}

impl Annotation {
    /// @ai:intent Dedent raw annotation text and split it into sections
    /// @ai:post leading blank lines are dropped before dedenting
    /// @ai:effects pure
    pub fn new(raw: &str, process: ProcessHandle) -> Self {
        let text = dedent(raw.trim_start_matches('\n'));
        let sections = split_sections(&text);
        tracing::debug!(sections = sections.len(), "split annotation");
        Self { sections, process }
    }

    /// @ai:intent Get the raw dedented text of a section
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    /// @ai:intent Run a formatter over a section, `None` if the section is absent
    /// @ai:effects reads the process object
    pub fn section_with<T>(&self, name: &str, formatter: &Formatter<T>) -> Result<Option<T>> {
        let Some(text) = self.section(name) else {
            return Ok(None);
        };
        tracing::debug!(section = name, ?formatter, "formatting section");

        let value = match formatter {
            Formatter::Text(f) => f(text)?,
            Formatter::WithProcess(f) => {
                let process = self.process.upgrade().ok_or(Error::DetachedProcess)?;
                let process = process.try_borrow().map_err(|_| Error::ProcessBusy)?;
                f(text, &*process)?
            }
        };
        Ok(Some(value))
    }

    /// @ai:intent All sections in order of appearance
    pub fn sections(&self) -> &SectionMap {
        &self.sections
    }

    /// @ai:intent Section names in order of appearance
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.section(DESCRIPTION)
    }

    /// @ai:intent Input options merged with the process input declaration
    pub fn input(&self) -> Result<Option<OptionMap>> {
        self.section_with("input", &Formatter::with_process(enrich::input_options))
    }

    /// @ai:intent Output options overwritten from the process output declaration
    pub fn output(&self) -> Result<Option<OptionMap>> {
        self.section_with("output", &Formatter::with_process(enrich::output_options))
    }

    /// @ai:intent Args options filled from the process args
    pub fn args(&self) -> Result<Option<OptionMap>> {
        self.section_with("args", &Formatter::with_process(enrich::args_options))
    }

    /// @ai:intent Annotated config options filled from the process config
    pub fn config(&self) -> Result<Option<OptionMap>> {
        self.section_with("config", &Formatter::with_process(enrich::config_options))
    }

    /// @ai:intent Serializable view of the raw sections
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.sections
                .iter()
                .map(|(name, body)| (name.clone(), Value::String(body.clone())))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::parse_options;
    use crate::process::Proc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::rc::Rc;

    fn detached() -> ProcessHandle {
        let process: Rc<RefCell<dyn ProcessInfo>> = Rc::new(RefCell::new(Proc::new("gone")));
        Rc::downgrade(&process)
    }

    #[test]
    fn test_sections_and_formatters() {
        let process: Rc<RefCell<dyn ProcessInfo>> =
            Rc::new(RefCell::new(Proc::new("pAnnotate")));
        let anno = Annotation::new(
            "\n\t@description:\n\t\tdesc1\n\t\tdesc2\n\t@sec1:\n\t\tsec1\n\t\t\t- subsec1\n\t",
            Rc::downgrade(&process),
        );

        assert_eq!(anno.description(), Some("desc1\ndesc2\n"));
        assert_eq!(anno.section("sec"), None);
        assert_eq!(anno.section("sec1"), Some("sec1\n\t- subsec1\n"));

        let lines = Formatter::text(|text| Ok(text.lines().map(String::from).collect::<Vec<_>>()));
        assert_eq!(
            anno.section_with("sec1", &lines).unwrap(),
            Some(vec!["sec1".to_string(), "\t- subsec1".to_string()])
        );
        assert_eq!(anno.section_with("missing", &lines).unwrap(), None);

        let ids = Formatter::with_process(|text, process| {
            Ok(format!("{}:{}", process.id(), text.len()))
        });
        assert_eq!(
            anno.section_with("description", &ids).unwrap().as_deref(),
            Some("pAnnotate:12")
        );
    }

    #[test]
    fn test_missing_sections_are_none() {
        let anno = Annotation::new("just words", detached());
        assert_eq!(anno.description(), Some("just words\n"));
        assert!(anno.input().unwrap().is_none());
        assert!(anno.output().unwrap().is_none());
        assert!(anno.args().unwrap().is_none());
        assert!(anno.config().unwrap().is_none());
    }

    #[test]
    fn test_detached_process() {
        let anno = Annotation::new("@input:\n\ta: b\n", detached());
        assert!(matches!(anno.input(), Err(Error::DetachedProcess)));

        // text-only formatters never need the process
        let parsed = anno
            .section_with("input", &Formatter::text(parse_options))
            .unwrap()
            .unwrap();
        assert_eq!(parsed["a"], OptionEntry::new("", "b\n", None));
    }

    #[test]
    fn test_process_mutably_borrowed() {
        let process = Rc::new(RefCell::new(
            Proc::new("pBusy")
                .with_input("a")
                .with_config("annotate", "@input:\n\ta: the a\n"),
        ));
        crate::hook::proc_init(&process).unwrap();

        let guard = process.borrow_mut();
        let anno = guard.annotation().cloned().unwrap();
        assert!(matches!(anno.input(), Err(Error::ProcessBusy)));
        assert_eq!(anno.section("input"), Some("a: the a\n"));
        drop(guard);

        let input = anno.input().unwrap().unwrap();
        assert_eq!(input["a"].ty, "var");
    }

    #[test]
    fn test_format_error_propagates() {
        let anno = Annotation::new("@args:\n  orphan\n", detached());
        let err = anno
            .section_with("args", &Formatter::text(parse_options))
            .unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_blank_default() {
        assert!(OptionEntry::new("", "", None).has_blank_default());
        assert!(OptionEntry::new("", "", Some(json!(""))).has_blank_default());
        assert!(!OptionEntry::new("", "", Some(json!(0))).has_blank_default());
        assert!(!OptionEntry::new("", "", Some(json!("x"))).has_blank_default());
    }

    #[test]
    fn test_entry_serializes_type_field() {
        let value = serde_json::to_value(OptionEntry::new("file", "d\n", None)).unwrap();
        assert_eq!(value, json!({"type": "file", "desc": "d\n", "default": null}));
    }
}
