//! Edit engine for tame fixes.
//!
//! Responsibilities:
//! - Apply violations to in-memory manifest documents as targeted edits.
//! - Fingerprint before/after contents (sha256) and render a unified diff.
//! - Persist changed manifests through a [`ManifestWriter`] (atomic on disk).

mod writer;

pub use writer::{AtomicFsWriter, ManifestWriter, MemoryWriter};

use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io;
use tame_domain::Workspace;
use tame_types::{FileChange, FixReport, Violation, WriteError};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct FixOptions {
    /// Compute edits and the diff, write nothing.
    pub dry_run: bool,
    /// Worker threads for writes. `None` uses available parallelism.
    pub jobs: Option<usize>,
}

/// The new contents of one manifest, computed before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEdit {
    /// Relative to the workspace root.
    pub path: Utf8PathBuf,
    pub before: String,
    pub after: String,
    /// Number of fields whose value changed.
    pub edits: u64,
}

/// Applies every violation to a copy of its package's document.
///
/// Files whose content would not change are left out.
pub fn plan_edits(workspace: &Workspace, violations: &[Violation]) -> Result<Vec<PlannedEdit>, WriteError> {
    let mut by_manifest: BTreeMap<&Utf8Path, Vec<&Violation>> = BTreeMap::new();
    for v in violations {
        by_manifest.entry(v.manifest.as_path()).or_default().push(v);
    }

    let mut planned = Vec::new();
    for package in &workspace.members {
        let Some(group) = by_manifest.remove(package.manifest_path.as_path()) else {
            continue;
        };
        let abs = workspace.root.join(&package.manifest_path);
        let mut doc = package.manifest.clone();
        let mut edits = 0u64;
        for v in group {
            let key_path: Vec<&str> = v.key_path.iter().map(String::as_str).collect();
            let changed = doc
                .set(&key_path, &v.expected)
                .map_err(|e| WriteError::Edit {
                    path: abs.clone(),
                    message: e.to_string(),
                })?;
            if changed {
                edits += 1;
            }
        }

        let before = package.manifest.as_str();
        if doc.as_str() == before {
            debug!(manifest = %package.manifest_path, "no change");
            continue;
        }
        planned.push(PlannedEdit {
            path: package.manifest_path.clone(),
            before: before.to_string(),
            after: doc.into_string(),
            edits,
        });
    }

    if let Some((path, _)) = by_manifest.into_iter().next() {
        return Err(WriteError::Edit {
            path: workspace.root.join(path),
            message: "not a workspace member".to_string(),
        });
    }
    Ok(planned)
}

/// Plans and (unless `dry_run`) persists the edits for `violations`.
///
/// All edits are computed before the first write. There is no rollback if a
/// write fails part way.
pub fn apply_fixes(
    workspace: &Workspace,
    violations: &[Violation],
    writer: &dyn ManifestWriter,
    options: &FixOptions,
) -> Result<FixReport, WriteError> {
    let planned = plan_edits(workspace, violations)?;

    let mut report = FixReport::new(workspace.root.clone(), options.dry_run);
    report.files = planned.iter().map(file_change).collect();
    report.patch = render_patch(&planned);

    if !options.dry_run && !planned.is_empty() {
        write_all(&workspace.root, &planned, writer, options.jobs)?;
    }

    info!(
        files = report.files.len(),
        edits = report.edits_total(),
        dry_run = options.dry_run,
        "applied fixes"
    );
    Ok(report)
}

fn write_all(
    root: &Utf8Path,
    planned: &[PlannedEdit],
    writer: &dyn ManifestWriter,
    jobs: Option<usize>,
) -> Result<(), WriteError> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs.filter(|&j| j > 0) {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build().map_err(|e| WriteError::Io {
        path: root.to_path_buf(),
        source: io::Error::other(e),
    })?;

    let results: Vec<Result<(), WriteError>> = pool.install(|| {
        planned
            .par_iter()
            .map(|edit| writer.write_manifest(&root.join(&edit.path), &edit.after))
            .collect()
    });
    results.into_iter().collect()
}

fn file_change(edit: &PlannedEdit) -> FileChange {
    FileChange {
        path: edit.path.clone(),
        edits: edit.edits,
        before_sha256: sha256_hex(edit.before.as_bytes()),
        after_sha256: sha256_hex(edit.after.as_bytes()),
        before_bytes: edit.before.len() as u64,
        after_bytes: edit.after.len() as u64,
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Unified diff of every planned edit, in plan order.
pub fn render_patch(planned: &[PlannedEdit]) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for edit in planned {
        if edit.before == edit.after {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", edit.path));
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", edit.path));

        let patch = diffy::create_patch(&edit.before, &edit.after);
        let text = formatter.fmt_patch(&patch).to_string();
        let body = text
            .strip_prefix("--- original\n+++ modified\n")
            .unwrap_or(&text);
        out.push_str(body);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
