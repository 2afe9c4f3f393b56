//! @ai:module:intent Install the `annotate` configuration field on a process
//! @ai:module:layer application
//! @ai:module:public_api proc_init, ANNOTATE_FIELD
//! @ai:module:depends_on annotation, process, error
//! @ai:module:stateless true

use crate::annotation::{Annotation, ProcessHandle};
use crate::error::{Error, Result};
use crate::process::{ConfigField, ConfigRegistry, ConfigValue, ProcessInfo, RuntimePolicy};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Name of the configuration field holding the annotation.
pub const ANNOTATE_FIELD: &str = "annotate";

/// @ai:intent Register the annotate field with a converter from raw text to Annotation
/// @ai:post runtime configuration layers never override the field
/// @ai:post a value already set on the process is converted immediately
/// @ai:effects mutates process config
pub fn proc_init<P>(process: &Rc<RefCell<P>>) -> Result<()>
where
    P: ProcessInfo + ConfigRegistry + 'static,
{
    let weak: Weak<RefCell<P>> = Rc::downgrade(process);
    let handle: ProcessHandle = weak;
    let id = process.borrow().id().to_string();

    let converter = move |value: ConfigValue| -> Result<ConfigValue> {
        let raw = match value {
            ConfigValue::Annotation(_) => return Ok(value),
            ConfigValue::Plain(Value::String(raw)) => raw,
            ConfigValue::Plain(Value::Null) => String::new(),
            ConfigValue::Plain(other) => {
                return Err(Error::InvalidConfigValue {
                    name: ANNOTATE_FIELD.to_string(),
                    message: format!("expected annotation text, got {}", other),
                })
            }
        };
        tracing::debug!(process = %id, "converting annotation text");
        Ok(ConfigValue::Annotation(Annotation::new(&raw, handle.clone())))
    };

    process.borrow_mut().add_config(
        ANNOTATE_FIELD,
        ConfigField {
            default: ConfigValue::from(""),
            runtime: RuntimePolicy::Ignore,
            converter: Some(Box::new(converter)),
        },
    )
}
