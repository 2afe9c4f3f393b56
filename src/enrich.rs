//! @ai:module:intent Reconcile parsed option sections with a process's live declarations
//! @ai:module:layer application
//! @ai:module:public_api input_options, output_options, args_options, config_options
//! @ai:module:depends_on options, process, annotation
//! @ai:module:stateless true

use crate::annotation::{OptionEntry, OptionMap};
use crate::error::Result;
use crate::options::parse_options;
use crate::process::{type_name, ProcessInfo};
use serde_json::Value;

fn empty_string() -> Option<Value> {
    Some(Value::String(String::new()))
}

/// @ai:intent Merge declared inputs into the annotated input options
/// @ai:post declared inputs missing from the text are added with an empty default
/// @ai:post existing entries only get their type overwritten
/// @ai:effects pure
pub fn input_options(text: &str, process: &dyn ProcessInfo) -> Result<OptionMap> {
    let mut options = parse_options(text)?;

    for (name, ty) in process.input().typed_keys() {
        match options.get_mut(name) {
            Some(entry) => entry.ty = ty.to_string(),
            None => {
                options.insert(name.to_string(), OptionEntry::new(ty, "", empty_string()));
            }
        }
    }

    Ok(options)
}

/// @ai:intent Overwrite output types and defaults from the declared outputs
/// @ai:post type and default always match the process declaration
/// @ai:effects pure
pub fn output_options(text: &str, process: &dyn ProcessInfo) -> Result<OptionMap> {
    let mut options = parse_options(text)?;

    for (name, spec) in process.output() {
        let default = Some(Value::String(spec.template.source().to_string()));
        match options.get_mut(name) {
            Some(entry) => {
                entry.ty = spec.kind.clone();
                entry.default = default;
            }
            None => {
                options.insert(name.clone(), OptionEntry::new(spec.kind.as_str(), "", default));
            }
        }
    }

    Ok(options)
}

/// @ai:intent Add every process arg, filling blank types and defaults
/// @ai:post annotated types and defaults win over live values
/// @ai:effects pure
pub fn args_options(text: &str, process: &dyn ProcessInfo) -> Result<OptionMap> {
    let mut options = parse_options(text)?;

    for (name, value) in process.args() {
        let entry = options
            .entry(name.clone())
            .or_insert_with(|| OptionEntry::new(type_name(value), "", Some(value.clone())));
        if entry.has_blank_default() {
            entry.default = Some(value.clone());
        }
        if entry.has_blank_type() {
            entry.ty = type_name(value).to_string();
        }
    }

    Ok(options)
}

/// @ai:intent Fill blank types and defaults of annotated config items only
/// @ai:post no config item absent from the text is ever added
/// @ai:effects pure
pub fn config_options(text: &str, process: &dyn ProcessInfo) -> Result<OptionMap> {
    let mut options = parse_options(text)?;

    for (name, value) in process.config() {
        let Some(entry) = options.get_mut(name) else {
            continue;
        };
        if entry.has_blank_type() {
            entry.ty = value.type_name().to_string();
        }
        if entry.has_blank_default() {
            entry.default = Some(value.to_value());
        }
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{InputSpec, Proc};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn keyed(pairs: &[(&str, Value)]) -> InputSpec {
        InputSpec::Keyed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<IndexMap<_, _>>(),
        )
    }

    #[test]
    fn test_input_overwrites_type_only() {
        let proc = Proc::new("p").with_input("infile:file");
        let options = input_options("infile: abc", &proc).unwrap();
        assert_eq!(options["infile"], OptionEntry::new("file", "abc\n", None));

        let proc = Proc::new("p").with_input(keyed(&[("infile:file", json!([1]))]));
        let options = input_options("infile (var): abc. Default: x", &proc).unwrap();
        assert_eq!(
            options["infile"],
            OptionEntry::new("file", "abc.\n", Some(json!("x")))
        );

        let proc = Proc::new("p").with_input(keyed(&[("invar", json!([1]))]));
        let options = input_options("invar: abc", &proc).unwrap();
        assert_eq!(options["invar"], OptionEntry::new("var", "abc\n", None));
    }

    #[test]
    fn test_input_inserts_undocumented() {
        let proc = Proc::new("p").with_input("infile:file");
        let options = input_options("", &proc).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(
            options["infile"],
            OptionEntry::new("file", "", Some(json!("")))
        );

        let proc = Proc::new("p").with_input(keyed(&[("invar", json!([1]))]));
        let options = input_options("", &proc).unwrap();
        assert_eq!(options["invar"], OptionEntry::new("var", "", Some(json!(""))));
    }

    #[test]
    fn test_output_always_overwrites() {
        let proc = Proc::new("p").with_output("outfile:file:abc").unwrap();

        let options = output_options("outfile (var): a. Default: other", &proc).unwrap();
        assert_eq!(
            options["outfile"],
            OptionEntry::new("file", "a.\n", Some(json!("abc")))
        );

        let options = output_options("", &proc).unwrap();
        assert_eq!(
            options["outfile"],
            OptionEntry::new("file", "", Some(json!("abc")))
        );
    }

    #[test]
    fn test_output_keeps_annotated_extras() {
        let proc = Proc::new("p").with_output("b:x").unwrap();
        let options = output_options("a: first\nb: second\n", &proc).unwrap();
        assert_eq!(options.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(options["a"], OptionEntry::new("", "first\n", None));
        assert_eq!(options["b"].ty, "var");
    }

    #[test]
    fn test_args_fill_blanks() {
        let proc = Proc::new("p").with_arg("params", json!({"a": 1}));

        let options = args_options("params (Diot): ddd", &proc).unwrap();
        assert_eq!(
            options["params"],
            OptionEntry::new("Diot", "ddd\n", Some(json!({"a": 1})))
        );

        let options = args_options("", &proc).unwrap();
        assert_eq!(
            options["params"],
            OptionEntry::new("dict", "", Some(json!({"a": 1})))
        );

        let options = args_options("params: ddd", &proc).unwrap();
        assert_eq!(
            options["params"],
            OptionEntry::new("dict", "ddd\n", Some(json!({"a": 1})))
        );
    }

    #[test]
    fn test_args_keep_annotated_default() {
        let proc = Proc::new("p").with_arg("n", json!(3));
        let options = args_options("n (int): count. Default: 5", &proc).unwrap();
        assert_eq!(options["n"], OptionEntry::new("int", "count.\n", Some(json!("5"))));
    }

    #[test]
    fn test_config_only_annotated() {
        let proc = Proc::new("p").with_config("report_template", "abc");

        assert!(config_options("", &proc).unwrap().is_empty());

        let options = config_options("report_template:", &proc).unwrap();
        assert_eq!(
            options["report_template"],
            OptionEntry::new("str", "\n", Some(json!("abc")))
        );
    }

    #[test]
    fn test_config_keeps_annotated_fields() {
        let proc = Proc::new("p")
            .with_config("forks", json!(4))
            .with_config("cache", json!(true));
        let options =
            config_options("forks (number): parallel jobs. Default: 1\nlang: not set\n", &proc)
                .unwrap();
        assert_eq!(options.keys().collect::<Vec<_>>(), vec!["forks", "lang"]);
        assert_eq!(
            options["forks"],
            OptionEntry::new("number", "parallel jobs.\n", Some(json!("1")))
        );
        assert_eq!(options["lang"], OptionEntry::new("", "not set\n", None));
    }

    #[test]
    fn test_format_error_is_atomic() {
        let proc = Proc::new("p").with_arg("x", json!(1));
        assert!(args_options("x: fine\nbroken line", &proc).is_err());
    }
}
