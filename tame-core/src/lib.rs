//! Embeddable core library for tame.
//!
//! Provides a clap-free entry point: repository reads go through
//! [`RepoView`] and manifest writes through [`ManifestWriter`], so hosts and
//! tests can swap the filesystem for memory.
//!
//! # Entry points
//!
//! - [`check`] / [`fix`]: filesystem-backed, default settings
//! - [`run_check`](pipeline::run_check) / [`run_fix`](pipeline::run_fix):
//!   explicit settings and ports

pub mod pipeline;
pub mod settings;

pub use pipeline::{check, fix, run_check, run_fix, CheckOutcome};
pub use settings::{CheckSettings, FixSettings};

// Re-export the ports so callers don't need tame-domain / tame-edit directly.
pub use tame_domain::{FsRepoView, InMemoryRepoView, RepoView};
pub use tame_edit::{AtomicFsWriter, ManifestWriter, MemoryWriter};
