#![no_main]

//! Fuzz target for targeted edits.
//!
//! After a successful `set`, the document must reparse, the new value must be
//! readable at the same path, and repeating the edit must be a no-op.

use libfuzzer_sys::fuzz_target;
use tame_manifest::{Dialect, Document};

#[derive(Debug, arbitrary::Arbitrary)]
struct SetInput {
    yaml: bool,
    text: String,
    path: Vec<String>,
    value: String,
}

fuzz_target!(|input: SetInput| {
    let dialect = if input.yaml { Dialect::Yaml } else { Dialect::Json };
    let Ok(mut doc) = Document::parse(dialect, &input.text) else { return };
    if input.path.is_empty() || input.path.len() > 4 {
        return;
    }
    let path: Vec<&str> = input.path.iter().map(String::as_str).collect();

    if doc.set(&path, &input.value).is_err() {
        return;
    }
    let reparsed = Document::parse(dialect, doc.as_str()).expect("edited document reparses");
    assert_eq!(reparsed.get_str(&path), Some(input.value.as_str()));
    assert_eq!(doc.set(&path, &input.value), Ok(false));
});
