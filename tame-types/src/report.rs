use crate::dependency::{CatalogName, DependencySection};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which root manifest declares the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceFlavor {
    /// `pnpm-workspace.yaml`
    Pnpm,
    /// `workspaces` in the root `package.json`
    PackageJson,
}

impl WorkspaceFlavor {
    pub fn root_manifest(self) -> &'static str {
        match self {
            WorkspaceFlavor::Pnpm => "pnpm-workspace.yaml",
            WorkspaceFlavor::PackageJson => "package.json",
        }
    }
}

/// Reconciliation policy for explicit constraints of catalog dependencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Explicit constraints must equal the catalog's canonical constraint.
    #[default]
    Pin,
    /// Dependencies present in the catalog must use the `catalog:` marker.
    Reference,
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileMode::Pin => f.write_str("pin"),
            ReconcileMode::Reference => f.write_str("reference"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The explicit constraint differs from the canonical one.
    Mismatch,
    /// The dependency is in the catalog but does not use the marker.
    NotReferenced,
}

/// A field that must be rewritten to conform to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Manifest path relative to the workspace root.
    pub manifest: Utf8PathBuf,
    pub section: DependencySection,
    pub dependency: String,
    /// Keys leading to the value inside the manifest.
    pub key_path: Vec<String>,
    pub kind: ViolationKind,
    /// Value currently in the manifest.
    pub current: String,
    /// Value the fixer writes.
    pub expected: String,
    /// Canonical constraint from the catalog.
    pub canonical: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    CatalogMissing,
    EntryMissing,
}

/// A catalog reference that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionError {
    pub manifest: Utf8PathBuf,
    pub section: DependencySection,
    pub dependency: String,
    pub catalog: CatalogName,
    pub reason: MissingReason,
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            MissingReason::CatalogMissing => write!(
                f,
                "{}: {}.{} references catalog '{}' which is not defined",
                self.manifest, self.section, self.dependency, self.catalog
            ),
            MissingReason::EntryMissing => write!(
                f,
                "{}: {}.{} has no entry in catalog '{}'",
                self.manifest, self.section, self.dependency, self.catalog
            ),
        }
    }
}

/// Result of `check`, handed to the reporting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub schema: String,
    pub root: Utf8PathBuf,
    pub flavor: WorkspaceFlavor,
    pub mode: ReconcileMode,
    pub catalog_entries: u64,
    pub packages: u64,
    #[serde(default)]
    pub violations: Vec<Violation>,
    #[serde(default)]
    pub errors: Vec<ResolutionError>,
}

impl CheckReport {
    pub fn new(root: Utf8PathBuf, flavor: WorkspaceFlavor, mode: ReconcileMode) -> Self {
        Self {
            schema: crate::schema::TAME_REPORT_V1.to_string(),
            root,
            flavor,
            mode,
            catalog_entries: 0,
            packages: 0,
            violations: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// True when there is nothing to fix and nothing unresolved.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.errors.is_empty()
    }
}

/// A manifest rewritten (or, on dry-run, that would be rewritten) by `fix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: Utf8PathBuf,
    pub edits: u64,
    pub before_sha256: String,
    pub after_sha256: String,
    pub before_bytes: u64,
    pub after_bytes: u64,
}

/// Result of `fix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixReport {
    pub schema: String,
    pub root: Utf8PathBuf,
    pub dry_run: bool,
    #[serde(default)]
    pub files: Vec<FileChange>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub patch: String,
}

impl FixReport {
    pub fn new(root: Utf8PathBuf, dry_run: bool) -> Self {
        Self {
            schema: crate::schema::TAME_FIX_V1.to_string(),
            root,
            dry_run,
            files: Vec::new(),
            patch: String::new(),
        }
    }

    pub fn edits_total(&self) -> u64 {
        self.files.iter().map(|f| f.edits).sum()
    }
}
