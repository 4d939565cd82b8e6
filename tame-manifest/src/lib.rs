//! Format-preserving manifest documents.
//!
//! A [`Document`] keeps the exact source text of a manifest together with an
//! ordered tree of nodes, each carrying the byte span it was parsed from.
//! Reads walk the tree; [`Document::set`] splices the rendered scalar into the
//! source at the leaf's span and shifts every later span, so bytes outside the
//! edited leaf never change.
//!
//! Dialects:
//! - [`Dialect::Json`]: `package.json` (full JSON grammar).
//! - [`Dialect::Yaml`]: `pnpm-workspace.yaml` (block-style subset, validated
//!   with `serde_yaml` first).
//!
//! Round-trip law: `Document::parse(d, s)?.to_string() == s` when no `set`
//! was made.

mod document;
mod error;
mod json;
mod yaml;

pub use document::{Document, Entry, MapNode, Node, QuoteStyle, ScalarKind, ScalarNode, SeqNode, Span};
pub use error::EditError;
pub use tame_types::ParseError;

/// Manifest syntax understood by [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Json,
    Yaml,
}
