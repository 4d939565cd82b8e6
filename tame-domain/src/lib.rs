//! Domain logic: turn a workspace on disk into catalog violations.
//!
//! This crate owns *what* is out of line with the catalog. It does not own
//! *how* manifests are rewritten; that's the `tame-edit` crate.

mod catalog;
mod ports;
mod reconciler;
mod scanner;

pub use catalog::resolve_catalog;
pub use ports::{FsRepoView, InMemoryRepoView, RepoView};
pub use reconciler::{reconcile, Reconciliation};
pub use scanner::{scan, Package, ScanOptions, Workspace, DEFAULT_EXCLUDE};
