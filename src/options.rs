//! @ai:module:intent Parse option-style lines of a section into ordered entries
//! @ai:module:layer domain
//! @ai:module:public_api parse_options
//! @ai:module:depends_on annotation, error
//! @ai:module:stateless true

use crate::annotation::{OptionEntry, OptionMap};
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// name(type): rest, optionally wrapped in backticks up to the colon
static RE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"`(?P<qname>[\w.\-]+)(?:\s*:?\s*\((?P<qtype>[\w.|\-]+)\)|:(?P<qbare>[\w.|\-]+))?`",
        r"|",
        r"(?P<name>[\w.\-]+)(?:\s*:?\s*\((?P<type>[\w.|\-]+)\))?",
        r")\s*:(?P<rest>.*)$"
    ))
    .expect("Invalid regex")
});

/// Splits a header at its first occurrence; later markers stay in the default.
const DEFAULT_MARKER: &str = "Default:";

/// @ai:intent Parse `name (type): description. Default: value` lines into entries
/// @ai:pre text is a dedented section body
/// @ai:post every entry description ends with a newline
/// @ai:post entries keep the order of their first header line
/// @ai:effects pure
/// @ai:edge_cases blank lines inside one option are kept, trailing ones are dropped
pub fn parse_options(text: &str) -> Result<OptionMap> {
    let mut options = OptionMap::new();
    let mut current: Option<String> = None;
    let mut pending_blank = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;

        if line.trim().is_empty() {
            if current.is_some() {
                pending_blank += 1;
            }
            continue;
        }

        if line.starts_with([' ', '\t']) {
            let name = current.as_ref().ok_or_else(|| {
                Error::format(
                    line_number,
                    format!("unexpected indentation before any option: {:?}", line),
                )
            })?;
            if let Some(entry) = options.get_mut(name) {
                for _ in 0..pending_blank {
                    entry.desc.push('\n');
                }
                entry.desc.push_str(&expand_leading_tabs(line));
                entry.desc.push('\n');
            }
            pending_blank = 0;
            continue;
        }

        let (name, entry) = parse_header(line)
            .ok_or_else(|| Error::format(line_number, format!("not an option line: {:?}", line)))?;
        tracing::trace!(option = %name, ty = %entry.ty, "parsed option header");

        options.insert(name.clone(), entry);
        current = Some(name);
        pending_blank = 0;
    }

    Ok(options)
}

/// @ai:intent Parse a single non-indented header line
/// @ai:effects pure
fn parse_header(line: &str) -> Option<(String, OptionEntry)> {
    let caps = RE_HEADER.captures(line)?;

    let name = caps
        .name("qname")
        .or_else(|| caps.name("name"))
        .map(|m| m.as_str().to_string())?;
    let ty = caps
        .name("qtype")
        .or_else(|| caps.name("qbare"))
        .or_else(|| caps.name("type"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");

    let (desc, default) = match rest.split_once(DEFAULT_MARKER) {
        Some((desc, default)) => {
            let default = default.trim();
            let default = (!default.is_empty()).then(|| Value::String(default.to_string()));
            (desc, default)
        }
        None => (rest, None),
    };

    Some((
        name,
        OptionEntry {
            ty,
            desc: format!("{}\n", desc.trim()),
            default,
        },
    ))
}

/// @ai:intent Replace each leading tab with two spaces, keep leading spaces as-is
/// @ai:effects pure
fn expand_leading_tabs(line: &str) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    let indent = &line[..line.len() - body.len()];

    let mut out = String::with_capacity(line.len() + indent.len());
    for c in indent.chars() {
        if c == '\t' {
            out.push_str("  ");
        } else {
            out.push(c);
        }
    }
    out.push_str(body);
    out
}
