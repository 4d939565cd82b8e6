//! Property-based tests for the manifest model.
//!
//! Invariants:
//! - Round-trip: parse then serialize reproduces the input byte for byte.
//! - Targeted edit: `set` changes only the bytes of the edited leaf.
//! - Totality: arbitrary input yields `Ok` or `Err`, never a panic.

use proptest::prelude::*;
use serde_json::{Map, Value};
use tame_manifest::{Dialect, Document};

fn arb_json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        any::<String>().prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-zA-Z@/_.-]{0,12}", inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"(@[a-z]{1,6}/)?[a-z][a-z0-9-]{0,10}").unwrap()
}

fn arb_constraint() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"(\^|~|>=)?[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{1,2}(-beta\.[0-9])?").unwrap()
}

fn arb_deps() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map(arb_name(), arb_constraint(), 1..8)
        .prop_map(|deps| deps.into_iter().collect())
}

fn package_json(deps: &[(String, String)], indent: &str, newline: &str) -> String {
    let mut out = format!("{{{newline}{indent}\"name\": \"pkg\",{newline}{indent}\"dependencies\": {{");
    for (i, (name, constraint)) in deps.iter().enumerate() {
        let sep = if i + 1 == deps.len() { "" } else { "," };
        out.push_str(&format!(
            "{newline}{indent}{indent}\"{name}\": \"{constraint}\"{sep}"
        ));
    }
    out.push_str(&format!("{newline}{indent}}}{newline}}}{newline}"));
    out
}

fn pnpm_workspace(deps: &[(String, String)], styles: &[u8]) -> String {
    let mut out = String::from("# generated\npackages:\n  - 'packages/*'\n\ncatalog:\n");
    for (i, (name, constraint)) in deps.iter().enumerate() {
        let key = if name.starts_with('@') {
            format!("'{name}'")
        } else {
            name.clone()
        };
        let value = match styles[i % styles.len()] % 3 {
            0 => format!("\"{constraint}\""),
            1 => format!("'{constraint}'"),
            _ => format!("'{constraint}' # keep"),
        };
        out.push_str(&format!("  {key}: {value}\n"));
    }
    out
}

proptest! {
    #[test]
    fn json_round_trips_compact_and_pretty(value in arb_json_value()) {
        for text in [
            serde_json::to_string(&value).unwrap(),
            serde_json::to_string_pretty(&value).unwrap(),
        ] {
            let doc = Document::parse(Dialect::Json, &text).unwrap();
            prop_assert_eq!(doc.to_string(), text);
        }
    }

    #[test]
    fn json_set_only_changes_the_target(
        deps in arb_deps(),
        pick in any::<prop::sample::Index>(),
        replacement in arb_constraint(),
        crlf in any::<bool>(),
        tabs in any::<bool>(),
    ) {
        let newline = if crlf { "\r\n" } else { "\n" };
        let indent = if tabs { "\t" } else { "  " };
        let text = package_json(&deps, indent, newline);
        let (name, old) = &deps[pick.index(deps.len())];

        let mut doc = Document::parse(Dialect::Json, &text).unwrap();
        doc.set(&["dependencies", name], &replacement).unwrap();

        let needle = format!("\"{name}\": \"{old}\"");
        let expected = text.replacen(&needle, &format!("\"{name}\": \"{replacement}\""), 1);
        prop_assert_eq!(doc.as_str(), expected.as_str());

        let reparsed = Document::parse(Dialect::Json, doc.as_str()).unwrap();
        for (other, constraint) in &deps {
            let want = if other == name { &replacement } else { constraint };
            prop_assert_eq!(reparsed.get_str(&["dependencies", other]), Some(want.as_str()));
        }
    }

    #[test]
    fn yaml_round_trips_and_reads_catalog(
        deps in arb_deps(),
        styles in prop::collection::vec(any::<u8>(), 1..4),
    ) {
        let text = pnpm_workspace(&deps, &styles);
        let doc = Document::parse(Dialect::Yaml, &text).unwrap();
        prop_assert_eq!(doc.to_string(), text.clone());
        for (name, constraint) in &deps {
            prop_assert_eq!(doc.get_str(&["catalog", name]), Some(constraint.as_str()));
        }
    }

    #[test]
    fn yaml_set_keeps_other_lines(
        deps in arb_deps(),
        styles in prop::collection::vec(any::<u8>(), 1..4),
        pick in any::<prop::sample::Index>(),
        replacement in arb_constraint(),
    ) {
        let text = pnpm_workspace(&deps, &styles);
        let idx = pick.index(deps.len());
        let (name, _) = &deps[idx];

        let mut doc = Document::parse(Dialect::Yaml, &text).unwrap();
        doc.set(&["catalog", name], &replacement).unwrap();

        let before: Vec<&str> = text.lines().collect();
        let after: Vec<&str> = doc.as_str().lines().collect();
        prop_assert_eq!(before.len(), after.len());
        let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
        prop_assert!(changed.len() <= 1);

        let reparsed = Document::parse(Dialect::Yaml, doc.as_str()).unwrap();
        prop_assert_eq!(reparsed.get_str(&["catalog", name]), Some(replacement.as_str()));
    }

    #[test]
    fn parsing_never_panics(text in "[ -~\t\n\r]{0,80}") {
        let _ = Document::parse(Dialect::Json, &text);
        let _ = Document::parse(Dialect::Yaml, &text);
    }
}
