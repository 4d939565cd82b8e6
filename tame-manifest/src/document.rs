use crate::error::EditError;
use crate::{json, yaml, Dialect};
use std::fmt;
use tame_types::ParseError;

/// Half-open byte range `[start, end)` into a document's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn shift(&mut self, at: usize, delta: isize) {
        if self.start >= at {
            self.start = self.start.saturating_add_signed(delta);
        }
        if self.end >= at {
            self.end = self.end.saturating_add_signed(delta);
        }
    }
}

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Number,
    Bool,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarNode {
    pub span: Span,
    pub kind: ScalarKind,
    pub style: QuoteStyle,
    /// Decoded text (escapes resolved, quotes stripped).
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub key_span: Span,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub span: Span,
    pub flow: bool,
    /// Source order, duplicates kept.
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeqNode {
    pub span: Span,
    pub flow: bool,
    pub items: Vec<Node>,
}

/// One node of the ordered document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Map(MapNode),
    Seq(SeqNode),
    Scalar(ScalarNode),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Map(m) => m.span,
            Node::Seq(s) => s.span,
            Node::Scalar(s) => s.span,
        }
    }

    pub fn as_map(&self) -> Option<&MapNode> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&SeqNode> {
        match self {
            Node::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarNode> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Text of a scalar node, `None` for containers.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().map(|s| s.text.as_str())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(s) if s.kind == ScalarKind::Null)
    }

    /// Map lookup; the last occurrence of a duplicated key wins.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?
            .entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self {
            Node::Map(m) => m
                .entries
                .iter_mut()
                .rev()
                .find(|e| e.key == key)
                .map(|e| &mut e.value),
            _ => None,
        }
    }

    fn shift(&mut self, at: usize, delta: isize) {
        match self {
            Node::Map(m) => {
                m.span.shift(at, delta);
                for entry in &mut m.entries {
                    entry.key_span.shift(at, delta);
                    entry.value.shift(at, delta);
                }
            }
            Node::Seq(s) => {
                s.span.shift(at, delta);
                for item in &mut s.items {
                    item.shift(at, delta);
                }
            }
            Node::Scalar(s) => s.span.shift(at, delta),
        }
    }
}

/// A parsed manifest: source text plus its span-annotated tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    dialect: Dialect,
    source: String,
    root: Node,
}

impl Document {
    pub fn parse(dialect: Dialect, text: &str) -> Result<Self, ParseError> {
        let root = match dialect {
            Dialect::Json => json::parse(text)?,
            Dialect::Yaml => yaml::parse(text)?,
        };
        Ok(Self {
            dialect,
            source: text.to_string(),
            root,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Current source text, including any edits made with [`Document::set`].
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }

    /// Follows `path` through nested maps. An empty path is the root.
    pub fn get(&self, path: &[&str]) -> Option<&Node> {
        path.iter().try_fold(&self.root, |node, key| node.get(key))
    }

    /// Scalar text at `path`.
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Replaces the scalar at `path` with the string `value`.
    ///
    /// Returns `Ok(false)` when the leaf already holds exactly that string.
    /// Only the leaf's bytes change; every later span is shifted by the
    /// length difference.
    pub fn set(&mut self, path: &[&str], value: &str) -> Result<bool, EditError> {
        let dialect = self.dialect;
        let leaf = self.leaf_mut(path)?;
        if leaf.kind == ScalarKind::String && leaf.text == value {
            return Ok(false);
        }

        let (rendered, style) = match dialect {
            Dialect::Json => (json::render_string(value), QuoteStyle::DoubleQuoted),
            Dialect::Yaml => yaml::render_scalar(value, leaf.style),
        };
        let old = leaf.span;
        // `key:` with nothing after it has an empty span; keep a separator.
        let (rendered, lead) = if old.is_empty() && dialect == Dialect::Yaml {
            (format!(" {rendered}"), 1)
        } else {
            (rendered, 0)
        };
        leaf.text = value.to_string();
        leaf.kind = ScalarKind::String;
        leaf.style = style;

        self.source.replace_range(old.start..old.end, &rendered);
        let delta = rendered.len() as isize - old.len() as isize;
        self.root.shift(old.end, delta);

        let leaf = self.leaf_mut(path)?;
        leaf.span = Span::new(old.start + lead, old.start + rendered.len());
        Ok(true)
    }

    fn leaf_mut(&mut self, path: &[&str]) -> Result<&mut ScalarNode, EditError> {
        let mut node = &mut self.root;
        for key in path {
            node = node.get_mut(key).ok_or_else(|| EditError::PathNotFound {
                path: path.join("."),
            })?;
        }
        match node {
            Node::Scalar(scalar) => Ok(scalar),
            _ => Err(EditError::NotAScalar {
                path: path.join("."),
            }),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
