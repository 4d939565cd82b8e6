//! YAML adapter for the block-style subset used by workspace manifests.
//!
//! Input is validated with `serde_yaml` first, so the span parser below only
//! has to understand well-formed documents. Constructs outside the subset are
//! reported as parse errors naming the construct.

use crate::document::{Entry, MapNode, Node, QuoteStyle, ScalarKind, ScalarNode, SeqNode, Span};
use tame_types::ParseError;

const MAX_DEPTH: usize = 256;
const BOM: &str = "\u{feff}";

pub(crate) fn parse(text: &str) -> Result<Node, ParseError> {
    if let Err(err) = serde_yaml::from_str::<serde_yaml::Value>(text) {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));
        return Err(ParseError::new(line, column, err.to_string()));
    }

    let lines = split_lines(text)?;
    let mut parser = Parser { text, lines, i: 0 };
    parser.document()
}

/// Renders `value` for a leaf written in `style`, falling back to double
/// quotes when the style cannot hold it.
pub(crate) fn render_scalar(value: &str, style: QuoteStyle) -> (String, QuoteStyle) {
    let single_ok = !value.chars().any(|c| c.is_control() && c != '\t');
    match style {
        QuoteStyle::SingleQuoted if single_ok => (
            format!("'{}'", value.replace('\'', "''")),
            QuoteStyle::SingleQuoted,
        ),
        QuoteStyle::Plain if is_plain_safe(value) => (value.to_string(), QuoteStyle::Plain),
        _ => (double_quoted(value), QuoteStyle::DoubleQuoted),
    }
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// True when `value` reads back as the same string without quotes.
fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    !"-?:,[]{}#&*!|>'\"%@`".contains(first)
        && !value.starts_with([' ', '\t'])
        && !value.ends_with([' ', '\t', ':'])
        && !value.chars().any(|c| c.is_control() || ",[]{}".contains(c))
        && !value.contains(": ")
        && !value.contains(" #")
        && classify_plain(value) == ScalarKind::String
}

fn classify_plain(raw: &str) -> ScalarKind {
    match raw {
        "" | "~" | "null" | "Null" | "NULL" => ScalarKind::Null,
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => ScalarKind::Bool,
        _ if is_number(raw) => ScalarKind::Number,
        _ => ScalarKind::String,
    }
}

fn is_number(raw: &str) -> bool {
    let all = |s: &str, f: fn(&u8) -> bool| !s.is_empty() && s.as_bytes().iter().all(f);
    if let Some(oct) = raw.strip_prefix("0o") {
        return all(oct, |b| (b'0'..=b'7').contains(b));
    }
    if let Some(hex) = raw.strip_prefix("0x") {
        return all(hex, u8::is_ascii_hexdigit);
    }
    if matches!(raw, ".nan" | ".NaN" | ".NAN") {
        return true;
    }
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            (int.is_empty() || all(int, u8::is_ascii_digit))
                && (frac.is_empty() || all(frac, u8::is_ascii_digit))
                && !(int.is_empty() && frac.is_empty())
        }
        None => all(mantissa, u8::is_ascii_digit),
    };
    let exponent_ok = match exponent {
        Some(exp) => all(exp.strip_prefix(['-', '+']).unwrap_or(exp), u8::is_ascii_digit),
        None => true,
    };
    mantissa_ok && exponent_ok
}

/// A non-blank line with comments and trailing whitespace removed.
#[derive(Debug, Clone, Copy)]
struct Line {
    begin: usize,
    start: usize,
    end: usize,
}

impl Line {
    fn indent(&self) -> usize {
        self.start - self.begin
    }
}

fn split_lines(text: &str) -> Result<Vec<Line>, ParseError> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut seen_marker = false;
    let mut ended = false;
    let mut begin = if text.starts_with(BOM) { BOM.len() } else { 0 };

    while begin <= text.len() {
        let eol = text[begin..]
            .find('\n')
            .map(|i| begin + i)
            .unwrap_or(text.len());

        let mut start = begin;
        while start < eol && bytes[start] == b' ' {
            start += 1;
        }
        let mut end = strip_comment(bytes, start, eol);
        while end > start && matches!(bytes[end - 1], b' ' | b'\t' | b'\r') {
            end -= 1;
        }

        if start < end {
            if bytes[start] == b'\t' {
                return Err(ParseError::at(text, start, "tabs are not allowed in indentation"));
            }
            let content = &text[start..end];
            let is_marker = start == begin
                && (content == "---" || content.starts_with("--- ") || content.starts_with("---\t"));
            if is_marker {
                if seen_marker || !lines.is_empty() {
                    return Err(ParseError::at(text, start, "multiple documents are not supported"));
                }
                if content != "---" {
                    return Err(ParseError::at(
                        text,
                        start,
                        "content on the document start line is not supported",
                    ));
                }
                seen_marker = true;
            } else if start == begin && content == "..." {
                ended = true;
            } else if start == begin && content.starts_with('%') {
                return Err(ParseError::at(text, start, "directives are not supported"));
            } else if ended {
                return Err(ParseError::at(text, start, "multiple documents are not supported"));
            } else {
                lines.push(Line { begin, start, end });
            }
        }

        begin = eol + 1;
    }

    Ok(lines)
}

/// Returns the offset where a trailing comment starts, or `end`.
fn strip_comment(bytes: &[u8], start: usize, end: usize) -> usize {
    enum State {
        Plain,
        Single,
        Double,
    }

    let mut state = State::Plain;
    let mut i = start;
    while i < end {
        let b = bytes[i];
        let token_start = i == start || matches!(bytes[i - 1], b' ' | b'\t' | b'[' | b'{' | b',');
        match state {
            State::Plain => match b {
                b'#' if i == start || matches!(bytes[i - 1], b' ' | b'\t') => return i,
                b'\'' if token_start => state = State::Single,
                b'"' if token_start => state = State::Double,
                _ => {}
            },
            State::Single => {
                if b == b'\'' {
                    if bytes.get(i + 1) == Some(&b'\'') {
                        i += 1;
                    } else {
                        state = State::Plain;
                    }
                }
            }
            State::Double => match b {
                b'\\' => i += 1,
                b'"' => state = State::Plain,
                _ => {}
            },
        }
        i += 1;
    }
    end
}

struct Key {
    text: String,
    span: Span,
    after_colon: usize,
}

struct Parser<'a> {
    text: &'a str,
    lines: Vec<Line>,
    i: usize,
}

impl Parser<'_> {
    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::at(self.text, offset, message)
    }

    /// A deeper line right after a plain scalar continues that scalar.
    fn indentation_error(&self, line: Line, previous: Option<&Node>) -> ParseError {
        let message = match previous {
            Some(Node::Scalar(s)) if s.style == QuoteStyle::Plain && !s.text.is_empty() => {
                "multi-line plain scalars are not supported"
            }
            _ => "unexpected indentation",
        };
        self.error(line.start, message)
    }

    fn byte(&self, pos: usize) -> Option<u8> {
        self.text.as_bytes().get(pos).copied()
    }

    fn skip_blank(&self, mut pos: usize, end: usize) -> usize {
        while pos < end && matches!(self.byte(pos), Some(b' ' | b'\t')) {
            pos += 1;
        }
        pos
    }

    fn document(&mut self) -> Result<Node, ParseError> {
        let Some(first) = self.lines.first().copied() else {
            return Ok(null_scalar(0));
        };
        let root = self.block(first.indent(), 0)?;
        if let Some(line) = self.lines.get(self.i) {
            return Err(self.error(line.start, "unexpected content after document root"));
        }
        Ok(root)
    }

    fn is_seq_item(&self, line: Line) -> bool {
        let content = &self.text.as_bytes()[line.start..line.end];
        content == b"-" || content.starts_with(b"- ") || content.starts_with(b"-\t")
    }

    fn check_unsupported(&self, pos: usize) -> Result<(), ParseError> {
        match self.byte(pos) {
            Some(b'&') => Err(self.error(pos, "anchors are not supported")),
            Some(b'*') => Err(self.error(pos, "aliases are not supported")),
            Some(b'!') => Err(self.error(pos, "tags are not supported")),
            Some(b'|' | b'>') => Err(self.error(pos, "block scalars are not supported")),
            Some(b'?') if matches!(self.byte(pos + 1), Some(b' ' | b'\t' | b'\n' | b'\r') | None) => {
                Err(self.error(pos, "complex mapping keys are not supported"))
            }
            _ => Ok(()),
        }
    }

    /// Recognizes `key: ...` at the start of `line`.
    fn key_of(&self, line: Line) -> Result<Option<Key>, ParseError> {
        self.check_unsupported(line.start)?;
        let bytes = self.text.as_bytes();
        let is_value_sep = |pos: usize| pos + 1 >= line.end || matches!(bytes[pos + 1], b' ' | b'\t');

        match bytes[line.start] {
            b'"' | b'\'' => {
                let (text, stop, _) = self.quoted(line.start)?;
                let colon = self.skip_blank(stop, line.end);
                if colon < line.end && bytes[colon] == b':' && is_value_sep(colon) {
                    Ok(Some(Key {
                        text,
                        span: Span::new(line.start, stop),
                        after_colon: colon + 1,
                    }))
                } else {
                    Ok(None)
                }
            }
            b'[' | b'{' => Ok(None),
            _ => {
                let Some(colon) = (line.start..line.end).find(|&p| bytes[p] == b':' && is_value_sep(p))
                else {
                    return Ok(None);
                };
                let raw = self.text[line.start..colon].trim_end_matches([' ', '\t']);
                Ok(Some(Key {
                    text: raw.to_string(),
                    span: Span::new(line.start, line.start + raw.len()),
                    after_colon: colon + 1,
                }))
            }
        }
    }

    fn block(&mut self, indent: usize, depth: usize) -> Result<Node, ParseError> {
        let line = self.lines[self.i];
        if depth > MAX_DEPTH {
            return Err(self.error(line.start, "nesting too deep"));
        }
        if self.is_seq_item(line) {
            self.seq(indent, depth)
        } else if self.key_of(line)?.is_some() {
            self.map(indent, depth)
        } else {
            self.inline_value(line.start, line.end, depth)
        }
    }

    fn map(&mut self, indent: usize, depth: usize) -> Result<Node, ParseError> {
        let start = self.lines[self.i].start;
        let mut end = start;
        let mut entries = Vec::new();

        while let Some(line) = self.lines.get(self.i).copied() {
            if line.indent() < indent {
                break;
            }
            if line.indent() > indent {
                return Err(self.indentation_error(line, entries.last().map(|e: &Entry| &e.value)));
            }
            let Some(key) = self.key_of(line)? else {
                let message = if self.is_seq_item(line) {
                    "unexpected sequence item inside a mapping"
                } else {
                    "expected a mapping key"
                };
                return Err(self.error(line.start, message));
            };

            let value_start = self.skip_blank(key.after_colon, line.end);
            let value = if value_start >= line.end {
                self.i += 1;
                match self.lines.get(self.i).copied() {
                    Some(next)
                        if next.indent() > indent
                            || (next.indent() == indent && self.is_seq_item(next)) =>
                    {
                        self.block(next.indent(), depth + 1)?
                    }
                    _ => null_scalar(key.after_colon),
                }
            } else {
                self.inline_value(value_start, line.end, depth + 1)?
            };

            end = value.span().end.max(key.after_colon);
            entries.push(Entry {
                key: key.text,
                key_span: key.span,
                value,
            });
        }

        Ok(Node::Map(MapNode {
            span: Span::new(start, end),
            flow: false,
            entries,
        }))
    }

    fn seq(&mut self, indent: usize, depth: usize) -> Result<Node, ParseError> {
        let start = self.lines[self.i].start;
        let mut end = start;
        let mut items = Vec::new();

        while let Some(line) = self.lines.get(self.i).copied() {
            if line.indent() < indent {
                break;
            }
            if line.indent() > indent {
                return Err(self.indentation_error(line, items.last()));
            }
            if !self.is_seq_item(line) {
                break;
            }

            let rest = self.skip_blank(line.start + 1, line.end);
            let item = if rest >= line.end {
                self.i += 1;
                match self.lines.get(self.i).copied() {
                    Some(next) if next.indent() > indent => self.block(next.indent(), depth + 1)?,
                    _ => null_scalar(line.start + 1),
                }
            } else {
                let nested = Line {
                    begin: line.begin,
                    start: rest,
                    end: line.end,
                };
                if self.is_seq_item(nested) || self.key_of(nested)?.is_some() {
                    // Compact form: `- key: value` or `- - item`.
                    self.lines[self.i] = nested;
                    self.block(nested.indent(), depth + 1)?
                } else {
                    self.inline_value(rest, line.end, depth + 1)?
                }
            };

            end = item.span().end.max(line.start + 1);
            items.push(item);
        }

        Ok(Node::Seq(SeqNode {
            span: Span::new(start, end),
            flow: false,
            items,
        }))
    }

    /// Parses a value that starts on the current line, then advances past
    /// every line it occupies.
    fn inline_value(&mut self, start: usize, end: usize, depth: usize) -> Result<Node, ParseError> {
        self.check_unsupported(start)?;
        match self.byte(start) {
            Some(b'[' | b'{') => {
                let (node, stop) = self.flow_node(start, depth)?;
                self.advance_past(stop)?;
                Ok(node)
            }
            Some(b'"' | b'\'') => {
                let (text, stop, style) = self.quoted(start)?;
                if self.skip_blank(stop, end) < end {
                    return Err(self.error(stop, "unexpected content after quoted scalar"));
                }
                self.i += 1;
                Ok(Node::Scalar(ScalarNode {
                    span: Span::new(start, stop),
                    kind: ScalarKind::String,
                    style,
                    text,
                }))
            }
            _ => {
                self.i += 1;
                Ok(plain_scalar(&self.text[start..end], start))
            }
        }
    }

    /// Moves the line cursor past the line holding the byte before `stop`.
    fn advance_past(&mut self, stop: usize) -> Result<(), ParseError> {
        let last = stop.saturating_sub(1);
        while let Some(line) = self.lines.get(self.i).copied() {
            self.i += 1;
            if line.start <= last && last < line.end {
                if self.skip_blank(stop, line.end) < line.end {
                    return Err(self.error(stop, "unexpected content after flow collection"));
                }
                return Ok(());
            }
        }
        Ok(())
    }

    fn skip_flow_ws(&self, mut pos: usize) -> usize {
        loop {
            match self.byte(pos) {
                Some(b' ' | b'\t' | b'\n' | b'\r') => pos += 1,
                Some(b'#') if pos == 0 || matches!(self.byte(pos - 1), Some(b' ' | b'\t' | b'\n')) => {
                    while !matches!(self.byte(pos), Some(b'\n') | None) {
                        pos += 1;
                    }
                }
                _ => return pos,
            }
        }
    }

    fn flow_node(&self, pos: usize, depth: usize) -> Result<(Node, usize), ParseError> {
        if depth > MAX_DEPTH {
            return Err(self.error(pos, "nesting too deep"));
        }
        let pos = self.skip_flow_ws(pos);
        self.check_unsupported(pos)?;
        match self.byte(pos) {
            None => Err(self.error(pos, "unterminated flow collection")),
            Some(b'[') => self.flow_seq(pos, depth),
            Some(b'{') => self.flow_map(pos, depth),
            Some(b'"' | b'\'') => {
                let (text, stop, style) = self.quoted(pos)?;
                let node = Node::Scalar(ScalarNode {
                    span: Span::new(pos, stop),
                    kind: ScalarKind::String,
                    style,
                    text,
                });
                Ok((node, stop))
            }
            Some(_) => {
                let stop = self.flow_plain_end(pos);
                if stop == pos {
                    return Err(self.error(pos, "expected a value"));
                }
                Ok((plain_scalar(&self.text[pos..stop], pos), stop))
            }
        }
    }

    /// End of a plain scalar inside a flow collection, trailing blanks excluded.
    fn flow_plain_end(&self, start: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut pos = start;
        while pos < bytes.len() {
            match bytes[pos] {
                b',' | b'[' | b']' | b'{' | b'}' | b'\n' | b'\r' => break,
                b':' if matches!(
                    bytes.get(pos + 1),
                    None | Some(b' ' | b'\t' | b'\n' | b'\r' | b',' | b'[' | b']' | b'{' | b'}')
                ) =>
                {
                    break;
                }
                b'#' if pos > start && matches!(bytes[pos - 1], b' ' | b'\t') => break,
                _ => pos += 1,
            }
        }
        while pos > start && matches!(bytes[pos - 1], b' ' | b'\t') {
            pos -= 1;
        }
        pos
    }

    fn flow_seq(&self, start: usize, depth: usize) -> Result<(Node, usize), ParseError> {
        let mut pos = start + 1;
        let mut items = Vec::new();
        loop {
            pos = self.skip_flow_ws(pos);
            if self.byte(pos) == Some(b']') {
                pos += 1;
                break;
            }
            let (item, stop) = self.flow_node(pos, depth + 1)?;
            items.push(item);
            pos = self.skip_flow_ws(stop);
            match self.byte(pos) {
                Some(b',') => pos += 1,
                Some(b']') => {
                    pos += 1;
                    break;
                }
                None => return Err(self.error(start, "unterminated flow sequence")),
                Some(_) => return Err(self.error(pos, "expected ',' or ']'")),
            }
        }
        let node = Node::Seq(SeqNode {
            span: Span::new(start, pos),
            flow: true,
            items,
        });
        Ok((node, pos))
    }

    fn flow_map(&self, start: usize, depth: usize) -> Result<(Node, usize), ParseError> {
        let mut pos = start + 1;
        let mut entries = Vec::new();
        loop {
            pos = self.skip_flow_ws(pos);
            match self.byte(pos) {
                Some(b'}') => {
                    pos += 1;
                    break;
                }
                None => return Err(self.error(start, "unterminated flow mapping")),
                _ => {}
            }

            self.check_unsupported(pos)?;
            let (key, key_span) = match self.byte(pos) {
                Some(b'"' | b'\'') => {
                    let (text, stop, _) = self.quoted(pos)?;
                    (text, Span::new(pos, stop))
                }
                _ => {
                    let stop = self.flow_plain_end(pos);
                    if stop == pos {
                        return Err(self.error(pos, "expected a mapping key"));
                    }
                    (self.text[pos..stop].to_string(), Span::new(pos, stop))
                }
            };

            pos = self.skip_flow_ws(key_span.end);
            if self.byte(pos) != Some(b':') {
                return Err(self.error(pos, "expected ':' after mapping key"));
            }
            let after_colon = pos + 1;
            pos = self.skip_flow_ws(after_colon);
            let value = match self.byte(pos) {
                Some(b',' | b'}') => null_scalar(after_colon),
                _ => {
                    let (value, stop) = self.flow_node(pos, depth + 1)?;
                    pos = stop;
                    value
                }
            };
            entries.push(Entry {
                key,
                key_span,
                value,
            });

            pos = self.skip_flow_ws(pos);
            match self.byte(pos) {
                Some(b',') => pos += 1,
                Some(b'}') => {
                    pos += 1;
                    break;
                }
                None => return Err(self.error(start, "unterminated flow mapping")),
                Some(_) => return Err(self.error(pos, "expected ',' or '}'")),
            }
        }
        let node = Node::Map(MapNode {
            span: Span::new(start, pos),
            flow: true,
            entries,
        });
        Ok((node, pos))
    }

    /// Parses a single-line quoted scalar starting at its opening quote.
    /// Returns the decoded text and the offset just past the closing quote.
    fn quoted(&self, start: usize) -> Result<(String, usize, QuoteStyle), ParseError> {
        let bytes = self.text.as_bytes();
        let double = bytes[start] == b'"';
        let mut out = String::new();
        let mut pos = start + 1;
        let mut run = pos;
        loop {
            match bytes.get(pos).copied() {
                None => return Err(self.error(start, "unterminated quoted scalar")),
                Some(b'\n' | b'\r') => {
                    return Err(self.error(start, "multi-line quoted scalars are not supported"));
                }
                Some(b'"') if double => {
                    out.push_str(&self.text[run..pos]);
                    return Ok((out, pos + 1, QuoteStyle::DoubleQuoted));
                }
                Some(b'\\') if double => {
                    out.push_str(&self.text[run..pos]);
                    pos = self.escape(pos + 1, &mut out)?;
                    run = pos;
                }
                Some(b'\'') if !double => {
                    out.push_str(&self.text[run..pos]);
                    if bytes.get(pos + 1) == Some(&b'\'') {
                        out.push('\'');
                        pos += 2;
                        run = pos;
                    } else {
                        return Ok((out, pos + 1, QuoteStyle::SingleQuoted));
                    }
                }
                Some(_) => pos += 1,
            }
        }
    }

    /// Decodes the escape whose letter is at `pos`; returns the next offset.
    fn escape(&self, pos: usize, out: &mut String) -> Result<usize, ParseError> {
        let simple = match self.byte(pos) {
            Some(b'0') => '\0',
            Some(b'a') => '\u{07}',
            Some(b'b') => '\u{08}',
            Some(b't' | b'\t') => '\t',
            Some(b'n') => '\n',
            Some(b'v') => '\u{0b}',
            Some(b'f') => '\u{0c}',
            Some(b'r') => '\r',
            Some(b'e') => '\u{1b}',
            Some(b' ') => ' ',
            Some(b'"') => '"',
            Some(b'/') => '/',
            Some(b'\\') => '\\',
            Some(b'N') => '\u{85}',
            Some(b'_') => '\u{a0}',
            Some(b'L') => '\u{2028}',
            Some(b'P') => '\u{2029}',
            Some(b'x') => return self.hex_escape(pos, 2, out),
            Some(b'u') => return self.hex_escape(pos, 4, out),
            Some(b'U') => return self.hex_escape(pos, 8, out),
            Some(b'\n' | b'\r') => {
                return Err(self.error(pos, "multi-line quoted scalars are not supported"));
            }
            _ => return Err(self.error(pos, "invalid escape sequence")),
        };
        out.push(simple);
        Ok(pos + 1)
    }

    fn hex_escape(&self, pos: usize, width: usize, out: &mut String) -> Result<usize, ParseError> {
        let digits = self
            .text
            .get(pos + 1..pos + 1 + width)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.error(pos, "invalid hex escape"))?;
        let c = u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(pos, "invalid unicode escape"))?;
        out.push(c);
        Ok(pos + 1 + width)
    }
}

fn null_scalar(at: usize) -> Node {
    Node::Scalar(ScalarNode {
        span: Span::new(at, at),
        kind: ScalarKind::Null,
        style: QuoteStyle::Plain,
        text: String::new(),
    })
}

fn plain_scalar(raw: &str, start: usize) -> Node {
    Node::Scalar(ScalarNode {
        span: Span::new(start, start + raw.len()),
        kind: classify_plain(raw),
        style: QuoteStyle::Plain,
        text: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(node: &Node) -> Vec<&str> {
        node.as_seq()
            .unwrap()
            .items
            .iter()
            .map(|n| n.as_str().unwrap())
            .collect()
    }

    #[test]
    fn parses_pnpm_workspace() {
        let text = "\
# workspace
packages:
  - 'packages/*'
  - \"apps/*\"   # apps
  - '!**/test/**'

catalog:
  react: ^18.2.0
  \"@types/node\": '20.11.0'
  lodash: 4.17.21

catalogs:
  react17:
    react: ^17.0.2
";
        let root = parse(text).unwrap();
        assert_eq!(
            texts(root.get("packages").unwrap()),
            vec!["packages/*", "apps/*", "!**/test/**"]
        );
        let catalog = root.get("catalog").unwrap();
        assert_eq!(catalog.get("react").and_then(Node::as_str), Some("^18.2.0"));
        assert_eq!(catalog.get("@types/node").and_then(Node::as_str), Some("20.11.0"));
        assert_eq!(catalog.get("lodash").and_then(Node::as_str), Some("4.17.21"));
        let named = root.get("catalogs").and_then(|c| c.get("react17")).unwrap();
        assert_eq!(named.get("react").and_then(Node::as_str), Some("^17.0.2"));
    }

    #[test]
    fn spans_point_at_source_bytes() {
        let text = "catalog:\n  foo: '^1.0.0'\n  bar: 2 # two\n";
        let root = parse(text).unwrap();
        let catalog = root.get("catalog").unwrap().as_map().unwrap();
        let foo = &catalog.entries[0];
        assert_eq!(&text[foo.key_span.start..foo.key_span.end], "foo");
        let span = foo.value.span();
        assert_eq!(&text[span.start..span.end], "'^1.0.0'");
        let bar = catalog.entries[1].value.as_scalar().unwrap();
        assert_eq!(&text[bar.span.start..bar.span.end], "2");
        assert_eq!(bar.kind, ScalarKind::Number);
    }

    #[test]
    fn sequence_at_parent_indent() {
        let text = "packages:\n- a\n- b\ncatalog: {}\n";
        let root = parse(text).unwrap();
        assert_eq!(texts(root.get("packages").unwrap()), vec!["a", "b"]);
        assert!(root.get("catalog").unwrap().as_map().unwrap().flow);
    }

    #[test]
    fn compact_mappings_in_sequences() {
        let text = "items:\n  - name: a\n    version: 1\n  - name: b\n";
        let root = parse(text).unwrap();
        let items = root.get("items").unwrap().as_seq().unwrap();
        assert_eq!(items.items.len(), 2);
        assert_eq!(items.items[0].get("version").and_then(Node::as_str), Some("1"));
        assert_eq!(items.items[1].get("name").and_then(Node::as_str), Some("b"));
    }

    #[test]
    fn flow_collections_across_lines() {
        let text = "packages: [\n  'a', # first\n  b,\n  ]\ncatalog: { x: ^1, \"y\": '2' }\n";
        let root = parse(text).unwrap();
        assert_eq!(texts(root.get("packages").unwrap()), vec!["a", "b"]);
        let catalog = root.get("catalog").unwrap();
        assert_eq!(catalog.get("x").and_then(Node::as_str), Some("^1"));
        assert_eq!(catalog.get("y").and_then(Node::as_str), Some("2"));
    }

    #[test]
    fn document_marker_and_empty_documents() {
        assert!(parse("---\ncatalog:\n  a: 1\n").unwrap().get("catalog").is_some());
        assert!(parse("").unwrap().is_null());
        assert!(parse("# only a comment\n").unwrap().is_null());
    }

    #[test]
    fn empty_values_are_null() {
        let root = parse("catalog:\npackages:\n").unwrap();
        assert!(root.get("catalog").unwrap().is_null());
        assert!(root.get("packages").unwrap().is_null());
    }

    #[test]
    fn quoted_escapes() {
        let root = parse("a: \"x\\ty\\u00e9\"\nb: 'it''s'\n").unwrap();
        assert_eq!(root.get("a").and_then(Node::as_str), Some("x\tyé"));
        assert_eq!(root.get("b").and_then(Node::as_str), Some("it's"));
    }

    #[test]
    fn rejects_unsupported_constructs() {
        let cases = [
            ("base: &b 1\nother: *b\n", "anchors"),
            ("a: !!str 1\n", "tags"),
            ("a: |\n  text\n", "block scalars"),
            ("a: \"multi\n  line\"\n", "multi-line"),
            ("catalog:\n  react: ^18\n    .2.0\n", "multi-line plain scalars"),
            ("packages:\n  - packages\n    /*\n", "multi-line plain scalars"),
        ];
        for (text, needle) in cases {
            let err = parse(text).unwrap_err();
            assert!(err.message.contains(needle), "{text:?}: {}", err.message);
        }
    }

    #[test]
    fn plain_scalar_continuation_names_its_position() {
        let err = parse("catalog:\n  react: ^18\n    .2.0\n").unwrap_err();
        assert_eq!((err.line, err.column), (3, 5));
        assert_eq!(err.message, "multi-line plain scalars are not supported");
    }

    #[test]
    fn rejects_invalid_yaml() {
        let err = parse("a: [1, 2\n").unwrap_err();
        assert!(err.line >= 1);
        assert!(parse("a: 1\n---\nb: 2\n").is_err());
    }

    #[test]
    fn plain_rendering_falls_back_to_double_quotes() {
        assert_eq!(render_scalar("^1.2.0", QuoteStyle::Plain).0, "^1.2.0");
        assert_eq!(render_scalar(">=1.0", QuoteStyle::Plain).0, "\">=1.0\"");
        assert_eq!(render_scalar("1.2", QuoteStyle::Plain).0, "\"1.2\"");
        assert_eq!(render_scalar("true", QuoteStyle::Plain).0, "\"true\"");
        assert_eq!(render_scalar("a: b", QuoteStyle::Plain).0, "\"a: b\"");
        assert_eq!(render_scalar("it's", QuoteStyle::SingleQuoted).0, "'it''s'");
        assert_eq!(render_scalar("a\nb", QuoteStyle::SingleQuoted).0, "\"a\\nb\"");
    }

    #[test]
    fn classifies_plain_scalars() {
        assert_eq!(classify_plain("~"), ScalarKind::Null);
        assert_eq!(classify_plain("False"), ScalarKind::Bool);
        assert_eq!(classify_plain("1.5e3"), ScalarKind::Number);
        assert_eq!(classify_plain("0x1F"), ScalarKind::Number);
        assert_eq!(classify_plain("-.inf"), ScalarKind::Number);
        assert_eq!(classify_plain("1.2.3"), ScalarKind::String);
        assert_eq!(classify_plain("^1.0"), ScalarKind::String);
        assert_eq!(classify_plain("."), ScalarKind::String);
    }
}
