//! @ai:module:intent Render enriched annotations as text or JSON
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, AnnotationReport, SectionReport, format_report, to_json
//! @ai:module:depends_on annotation, error
//! @ai:module:stateless true

use crate::annotation::{Annotation, OptionMap};
use crate::error::Result;
use colored::Colorize;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Rendered content of one section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionReport {
    Text(String),
    Options(OptionMap),
}

/// @ai:intent Every section of an annotation, option sections enriched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationReport {
    pub process: String,
    pub sections: IndexMap<String, SectionReport>,
}

impl AnnotationReport {
    /// @ai:intent Build a report of all sections, or of a single one
    /// @ai:post fails on the first section with malformed option text
    /// @ai:effects reads the process object
    pub fn build(process: &str, annotation: &Annotation, only: Option<&str>) -> Result<Self> {
        let mut sections = IndexMap::new();

        for name in annotation.section_names() {
            if only.is_some_and(|only| only != name) {
                continue;
            }
            let report = match name {
                "input" => annotation.input()?,
                "output" => annotation.output()?,
                "args" => annotation.args()?,
                "config" => annotation.config()?,
                _ => None,
            }
            .map(SectionReport::Options)
            .or_else(|| annotation.section(name).map(|s| SectionReport::Text(s.to_string())));

            if let Some(report) = report {
                sections.insert(name.to_string(), report);
            }
        }

        Ok(Self {
            process: process.to_string(),
            sections,
        })
    }
}

/// @ai:intent Format an annotation report as a string
/// @ai:effects pure
pub fn format_report(report: &AnnotationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report, false),
        OutputFormat::JsonPretty => to_json(report, true),
        OutputFormat::Text => Ok(format_report_text(report)),
    }
}

/// @ai:intent Format an annotation report as human-readable text
/// @ai:effects pure
fn format_report_text(report: &AnnotationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", report.process.bold()));

    for (name, section) in &report.sections {
        output.push_str(&format!("\n  {}:\n", name.cyan()));

        match section {
            SectionReport::Text(text) => {
                for line in text.lines() {
                    output.push_str(&format!("    {}\n", line));
                }
            }
            SectionReport::Options(options) if options.is_empty() => {
                output.push_str(&format!("    {}\n", "(none)".dimmed()));
            }
            SectionReport::Options(options) => {
                for (option, entry) in options {
                    let ty = if entry.ty.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", entry.ty.yellow())
                    };
                    output.push_str(&format!("    {}{}", option.green().bold(), ty));

                    let mut lines = entry.desc.lines();
                    match lines.next() {
                        Some(first) if !first.is_empty() => {
                            output.push_str(&format!(": {}\n", first))
                        }
                        _ => output.push('\n'),
                    }
                    for line in lines {
                        output.push_str(&format!("      {}\n", line));
                    }

                    if let Some(default) = &entry.default {
                        output.push_str(&format!(
                            "      {} {}\n",
                            "default:".dimmed(),
                            display_value(default)
                        ));
                    }
                }
            }
        }
    }

    output
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() => "''".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
