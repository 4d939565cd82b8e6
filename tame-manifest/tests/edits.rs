//! Targeted edits on realistic manifests.

use pretty_assertions::assert_eq;
use tame_manifest::{Dialect, Document, EditError, Node};

#[test]
fn package_json_edit_preserves_layout() {
    let before = r#"{
    "name": "@acme/web",
    "version": "1.0.0",
    "scripts": { "build": "tsc -b" },
    "dependencies": {
        "react": "^17.0.2",
        "left-pad": "1.3.0"
    },
    "devDependencies": {
        "typescript": "~5.3.0"
    }
}
"#;
    let after = r#"{
    "name": "@acme/web",
    "version": "1.0.0",
    "scripts": { "build": "tsc -b" },
    "dependencies": {
        "react": "^18.2.0",
        "left-pad": "1.3.0"
    },
    "devDependencies": {
        "typescript": "catalog:"
    }
}
"#;
    let mut doc = Document::parse(Dialect::Json, before).unwrap();
    doc.set(&["dependencies", "react"], "^18.2.0").unwrap();
    doc.set(&["devDependencies", "typescript"], "catalog:").unwrap();
    assert_eq!(doc.to_string(), after);
}

#[test]
fn crlf_and_bom_survive_edits() {
    let before = "\u{feff}{\r\n  \"dependencies\": {\r\n    \"a\": \"1\"\r\n  }\r\n}\r\n";
    let mut doc = Document::parse(Dialect::Json, before).unwrap();
    doc.set(&["dependencies", "a"], "2").unwrap();
    assert_eq!(
        doc.as_str(),
        "\u{feff}{\r\n  \"dependencies\": {\r\n    \"a\": \"2\"\r\n  }\r\n}\r\n"
    );
}

#[test]
fn escaped_values_are_re_escaped() {
    let mut doc = Document::parse(Dialect::Json, r#"{"d":{"x":"abc"}}"#).unwrap();
    assert_eq!(doc.get_str(&["d", "x"]), Some("abc"));
    doc.set(&["d", "x"], "say \"hi\"").unwrap();
    assert_eq!(doc.as_str(), r#"{"d":{"x":"say \"hi\""}}"#);
}

#[test]
fn numeric_leaf_becomes_string() {
    let mut doc = Document::parse(Dialect::Json, r#"{"d":{"x":1}}"#).unwrap();
    assert!(doc.set(&["d", "x"], "1").unwrap());
    assert_eq!(doc.as_str(), r#"{"d":{"x":"1"}}"#);
}

#[test]
fn pnpm_workspace_edit_keeps_comments() {
    let before = "\
packages:
  - packages/*   # libraries
  - apps/*

# shared versions
catalog:
  react: ^18.2.0 # keep in sync with docs
  'react-dom': \"^18.2.0\"
  zod: 3.22.4
";
    let mut doc = Document::parse(Dialect::Yaml, before).unwrap();
    doc.set(&["catalog", "react"], "^18.3.1").unwrap();
    doc.set(&["catalog", "react-dom"], "^18.3.1").unwrap();
    doc.set(&["catalog", "zod"], ">=3.23.0").unwrap();
    assert_eq!(
        doc.as_str(),
        "\
packages:
  - packages/*   # libraries
  - apps/*

# shared versions
catalog:
  react: ^18.3.1 # keep in sync with docs
  'react-dom': \"^18.3.1\"
  zod: \">=3.23.0\"
"
    );
}

#[test]
fn yaml_flow_mapping_edit() {
    let mut doc = Document::parse(Dialect::Yaml, "catalog: { a: '1', b: 2 }\n").unwrap();
    doc.set(&["catalog", "a"], "1.1").unwrap();
    doc.set(&["catalog", "b"], "^2").unwrap();
    assert_eq!(doc.as_str(), "catalog: { a: '1.1', b: ^2 }\n");
}

#[test]
fn edit_errors_name_the_path() {
    let mut doc = Document::parse(Dialect::Yaml, "packages:\n  - a\n").unwrap();
    let err = doc.set(&["catalog", "a"], "1").unwrap_err();
    assert_eq!(err, EditError::PathNotFound { path: "catalog.a".into() });
    assert_eq!(err.to_string(), "path `catalog.a` not found");

    let err = doc.set(&["packages"], "1").unwrap_err();
    assert!(matches!(err, EditError::NotAScalar { .. }));
}

#[test]
fn parse_errors_carry_position() {
    let err = Document::parse(Dialect::Json, "{\n  \"a\": 1,\n}").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.column, 1);

    let err = Document::parse(Dialect::Yaml, "a: &x 1\nb: *x\n").unwrap_err();
    assert!(err.message.contains("anchors"));
}

#[test]
fn tree_exposes_order() {
    let doc = Document::parse(Dialect::Json, r#"{"b":1,"a":2,"b":3}"#).unwrap();
    let keys: Vec<&str> = doc
        .root()
        .as_map()
        .unwrap()
        .entries
        .iter()
        .map(|e| e.key.as_str())
        .collect();
    assert_eq!(keys, vec!["b", "a", "b"]);
    assert_eq!(doc.root().get("b").and_then(Node::as_str), Some("3"));
}
