use pretty_assertions::assert_eq;
use proc_annotate::{
    input_options, parse_options, proc_init, split_sections, Annotation, Error, Formatter,
    InputSpec, OptionEntry, Proc, ProcessInfo,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn shared(proc: Proc) -> Rc<RefCell<Proc>> {
    let process = Rc::new(RefCell::new(proc));
    proc_init(&process).unwrap();
    process
}

#[test]
fn end_to_end_empty_sections() {
    let process = shared(Proc::new("pInput"));
    process
        .borrow_mut()
        .set_config("annotate", "x\n@input:\n@output:\n@config:\n@args:")
        .unwrap();
    let mut input = indexmap::IndexMap::new();
    input.insert("a".to_string(), json!([1]));
    process.borrow_mut().set_input(InputSpec::Keyed(input));

    let process = process.borrow();
    let anno = process.annotation().unwrap();
    assert_eq!(anno.description(), Some("x\n"));

    let input = anno.input().unwrap().unwrap();
    assert_eq!(input.len(), 1);
    assert_eq!(input["a"], OptionEntry::new("var", "", Some(json!(""))));
    assert_eq!(anno.output().unwrap().unwrap().len(), 0);
    assert_eq!(anno.config().unwrap().unwrap().len(), 0);
    assert_eq!(anno.args().unwrap().unwrap().len(), 0);
}

#[test]
fn sections_are_recomputed_on_every_access() {
    let process = shared(
        Proc::new("pFresh")
            .with_input("a")
            .with_config("annotate", "@input:\n\ta: the a input\n"),
    );

    let first = process.borrow().annotation().unwrap().input().unwrap().unwrap();
    assert_eq!(first["a"].ty, "var");

    process.borrow_mut().set_input("a:file, b:dir");

    let anno = process.borrow().annotation().cloned().unwrap();
    let second = anno.input().unwrap().unwrap();
    assert_eq!(second.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(second["a"], OptionEntry::new("file", "the a input\n", None));
    assert_eq!(second["b"], OptionEntry::new("dir", "", Some(json!(""))));
}

#[test]
fn malformed_section_fails_without_affecting_others() {
    let process = shared(
        Proc::new("pBroken")
            .with_arg("n", json!(1))
            .with_config("annotate", "ok\n@input:\n\tnot an option\n@args:\n\tn: count\n"),
    );
    let process = process.borrow();
    let anno = process.annotation().unwrap();

    let err = anno.input().unwrap_err();
    assert!(matches!(err, Error::Format { line: 1, .. }));

    let args = anno.args().unwrap().unwrap();
    assert_eq!(args["n"], OptionEntry::new("int", "count\n", Some(json!(1))));
    assert_eq!(anno.description(), Some("ok\n"));
}

#[test]
fn custom_formatters_on_any_section() {
    let process: Rc<RefCell<dyn ProcessInfo>> =
        Rc::new(RefCell::new(Proc::new("pCustom").with_input("infile:file")));
    let anno = Annotation::new(
        "
        Docs.
        @example:
            run it
        @input:
            infile: a file
        ",
        Rc::downgrade(&process),
    );

    let shout = Formatter::text(|text| Ok(text.trim().to_uppercase()));
    assert_eq!(
        anno.section_with("example", &shout).unwrap().as_deref(),
        Some("RUN IT")
    );

    let enriched = Formatter::with_process(input_options);
    let input = anno.section_with("input", &enriched).unwrap().unwrap();
    assert_eq!(input["infile"], OptionEntry::new("file", "a file\n", None));
}

#[test]
fn description_round_trip() {
    let text = "first line\n  indented\nlast\n@notes:\n\t\tnote\n";
    let sections = split_sections(text);
    assert_eq!(sections["description"], "first line\n  indented\nlast\n");
    assert_eq!(sections["notes"], "note\n");
}

#[test]
fn backtick_headers() {
    let options = parse_options("`tool (path)`: the tool. Default: /usr/bin/env\n`name`: plain\n").unwrap();
    assert_eq!(
        options["tool"],
        OptionEntry::new("path", "the tool.\n", Some(json!("/usr/bin/env")))
    );
    assert_eq!(options["name"], OptionEntry::new("", "plain\n", None));
}
