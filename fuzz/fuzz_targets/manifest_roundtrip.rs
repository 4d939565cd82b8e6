#![no_main]

//! Parsing must never panic, and an untouched document serializes to its
//! input byte for byte.

use libfuzzer_sys::fuzz_target;
use tame_manifest::{Dialect, Document};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };

    for dialect in [Dialect::Json, Dialect::Yaml] {
        if let Ok(doc) = Document::parse(dialect, text) {
            assert_eq!(doc.as_str(), text);
        }
    }
});
