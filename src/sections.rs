//! @ai:module:intent Split raw annotation text into named, dedented sections
//! @ai:module:layer domain
//! @ai:module:public_api split_sections, dedent, DESCRIPTION
//! @ai:module:stateless true

use crate::annotation::SectionMap;

/// Name of the implicit section collecting text before the first `@` marker.
pub const DESCRIPTION: &str = "description";

/// @ai:intent Split annotation text into sections keyed by `@name:` markers
/// @ai:post every body is dedented independently
/// @ai:post a repeated section name keeps appending to its first body
/// @ai:effects pure
pub fn split_sections(text: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if line.starts_with('@') {
            let name = section_name(line);
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let name = current.get_or_insert_with(|| DESCRIPTION.to_string());
        let body = sections.entry(name.clone()).or_default();
        body.push_str(line);
        body.push('\n');
    }

    for body in sections.values_mut() {
        *body = dedent(body);
    }

    sections
}

/// @ai:intent Derive a section name from an `@` marker line
/// @ai:effects pure
fn section_name(line: &str) -> String {
    line.trim_matches(|c| matches!(c, '@' | ':' | ' ' | '\t'))
        .to_string()
}

/// @ai:intent Remove the longest common leading whitespace from all lines
/// @ai:post whitespace-only lines become empty lines
/// @ai:post line endings are preserved
/// @ai:effects pure
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;

    for line in text.lines() {
        let content = line.trim_start_matches([' ', '\t']);
        if content.is_empty() {
            continue;
        }
        let indent = &line[..line.len() - content.len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }

    let margin = margin.unwrap_or("");
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        if body.trim_start_matches([' ', '\t']).is_empty() {
            out.push_str(ending);
            continue;
        }
        out.push_str(body.strip_prefix(margin).unwrap_or(body));
        out.push_str(ending);
    }

    out
}

/// @ai:intent Longest common prefix of two whitespace runs
/// @ai:effects pure
fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}
