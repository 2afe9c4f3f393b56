//! @ai:module:intent Docstring-style annotation parser for pipeline processes
//! @ai:module:layer infrastructure
//! @ai:module:public_api annotation, check, config, enrich, error, hook, options, output, process, sections
//! @ai:module:stateless true
//!
//! # proc-annotate
//!
//! Turns the free-form comment block attached to a pipeline process into
//! structured sections, and reconciles the option-style sections (`input`,
//! `output`, `args`, `config`) with what the process actually declares.
//!
//! ## Example
//!
//! ```rust
//! use proc_annotate::{proc_init, Proc};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let process = Rc::new(RefCell::new(
//!     Proc::new("pSort")
//!         .with_input("infile:file")
//!         .with_config("annotate", "Sort a file.\n@input:\n\tinfile: The file to sort\n"),
//! ));
//! proc_init(&process).unwrap();
//!
//! let process = process.borrow();
//! let annotation = process.annotation().unwrap();
//! assert_eq!(annotation.description(), Some("Sort a file.\n"));
//!
//! let input = annotation.input().unwrap().unwrap();
//! assert_eq!(input["infile"].ty, "file");
//! ```

pub mod annotation;
pub mod check;
pub mod config;
pub mod enrich;
pub mod error;
pub mod hook;
pub mod options;
pub mod output;
pub mod process;
pub mod sections;

pub use annotation::{Annotation, Formatter, OptionEntry, OptionMap, ProcessHandle, SectionMap};
pub use check::{check_file, check_path, CheckReport, CheckStatus};
pub use config::{ProcessFile, RuntimeConfig};
pub use enrich::{args_options, config_options, input_options, output_options};
pub use error::{Error, Result};
pub use hook::{proc_init, ANNOTATE_FIELD};
pub use options::parse_options;
pub use output::{format_report, to_json, AnnotationReport, OutputFormat, SectionReport};
pub use process::{
    type_name, ConfigField, ConfigRegistry, ConfigValue, InputSpec, OutputSpec, Proc,
    ProcessInfo, RuntimePolicy, Template,
};
pub use sections::{dedent, split_sections};
