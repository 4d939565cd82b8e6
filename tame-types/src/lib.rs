//! Shared DTOs (schemas-as-code) for the tame workspace.
//!
//! # Design constraints
//! - Report types are serialized for `--format json` consumers.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod catalog;
pub mod dependency;
pub mod error;
pub mod report;

pub use catalog::{Catalog, CatalogEntry, CatalogLookupMiss, CatalogTable};
pub use dependency::{CatalogName, DeclaredForm, DependencySection, DependencySpec};
pub use error::{ParseError, ResolutionFailure, TameError, WorkspaceError, WriteError};
pub use report::{
    CheckReport, FileChange, FixReport, MissingReason, ReconcileMode, ResolutionError, Violation,
    ViolationKind, WorkspaceFlavor,
};

/// Schema identifiers.
pub mod schema {
    pub const TAME_REPORT_V1: &str = "tame.report.v1";
    pub const TAME_FIX_V1: &str = "tame.fix.v1";
}

/// Reserved prefix of the catalog-reference marker.
pub const CATALOG_PROTOCOL: &str = "catalog:";

/// Name under which the unnamed catalog is addressable in `catalogs`.
pub const DEFAULT_CATALOG: &str = "default";
