//! Error taxonomy shared by every tame crate.
//!
//! All variants abort the run. The CLI is the only layer that prints them and
//! maps them to an exit code.

use crate::report::ResolutionError;
use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// The top-level error type for tame operations.
#[derive(Debug, Error)]
pub enum TameError {
    /// The workspace layout could not be established.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// A manifest is not valid under its dialect.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Catalog references without a matching entry (fatal for `fix` only).
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    /// Persisting a fix failed.
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl TameError {
    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Short machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            TameError::Workspace(_) => "workspace",
            TameError::Parse(_) => "parse",
            TameError::Resolution(_) => "resolution",
            TameError::Write(_) => "write",
        }
    }
}

/// Root manifest missing/unreadable or members unresolvable.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no pnpm-workspace.yaml or package.json with \"workspaces\" found in {root}")]
    RootManifestMissing { root: Utf8PathBuf },

    #[error("failed to read {path}")]
    Unreadable {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{manifest} declares no workspace member patterns")]
    NoMembers { manifest: Utf8PathBuf },

    #[error("{manifest}: `{field}` must be {expected}")]
    InvalidField {
        manifest: Utf8PathBuf,
        field: String,
        expected: &'static str,
    },

    #[error("invalid workspace pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("{manifest} defines the default catalog both as `catalog` and `catalogs.default`")]
    ConflictingDefaultCatalog { manifest: Utf8PathBuf },

    #[error("failed to start worker pool: {message}")]
    WorkerPool { message: String },
}

/// A manifest's bytes are not valid under its dialect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    pub path: Option<Utf8PathBuf>,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            path: None,
            line,
            column,
            message: message.into(),
        }
    }

    /// Builds an error positioned at byte `offset` of `text`.
    pub fn at(text: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(text.len());
        let before = &text[..floor_char_boundary(text, offset)];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self::new(line, column, message)
    }

    pub fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "failed to parse {}:{}:{}: {}",
                path, self.line, self.column, self.message
            ),
            None => write!(
                f,
                "parse error at {}:{}: {}",
                self.line, self.column, self.message
            ),
        }
    }
}

/// One or more catalog references did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ResolutionFailure {
    pub errors: Vec<ResolutionError>,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unresolved catalog reference{}",
            self.errors.len(),
            if self.errors.len() == 1 { "" } else { "s" }
        )?;
        for err in &self.errors {
            write!(f, "\n  {err}")?;
        }
        Ok(())
    }
}

/// I/O failure while persisting a fix.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot edit {path}: {message}")]
    Edit { path: Utf8PathBuf, message: String },
}

impl WriteError {
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            WriteError::Io { path, .. } | WriteError::Edit { path, .. } => path,
        }
    }
}
