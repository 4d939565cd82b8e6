//! The `check` and `fix` pipelines.
//!
//! Scanner, catalog resolver and reconciler run the same way for both; `fix`
//! then hands the violations to the edit engine.

use crate::settings::{CheckSettings, FixSettings};
use camino::Utf8Path;
use tame_domain::{reconcile, resolve_catalog, scan, FsRepoView, Reconciliation, RepoView, Workspace};
use tame_edit::{apply_fixes, AtomicFsWriter, FixOptions, ManifestWriter};
use tame_types::{Catalog, CheckReport, FixReport, ResolutionFailure, TameError};
use tracing::{debug, info};

/// Outcome of `run_check`.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub report: CheckReport,
    /// False when the workspace defines no catalog entries at all.
    pub has_catalog: bool,
}

/// Returns `false` iff the workspace at `path` has an empty catalog.
///
/// Violations and unresolved references do not affect the result; use
/// [`run_check`] to get them.
pub fn check(path: &Utf8Path) -> Result<bool, TameError> {
    let repo = FsRepoView::new(path.to_path_buf());
    Ok(run_check(&CheckSettings::default(), &repo)?.has_catalog)
}

/// Rewrites every non-conforming dependency of the workspace at `path`.
pub fn fix(path: &Utf8Path) -> Result<(), TameError> {
    let repo = FsRepoView::new(path.to_path_buf());
    run_fix(&FixSettings::default(), &repo, &AtomicFsWriter)?;
    Ok(())
}

/// Run the check pipeline. Never writes.
pub fn run_check(settings: &CheckSettings, repo: &dyn RepoView) -> Result<CheckOutcome, TameError> {
    let (workspace, catalog, reconciliation) = analyze(settings, repo)?;

    let mut report = CheckReport::new(workspace.root.clone(), workspace.flavor, settings.mode);
    report.packages = workspace.members.len() as u64;
    report.catalog_entries = catalog.entry_count() as u64;
    report.violations = reconciliation.violations;
    report.errors = reconciliation.errors;

    Ok(CheckOutcome {
        report,
        has_catalog: !catalog.is_empty(),
    })
}

/// Run the fix pipeline.
///
/// Unresolved catalog references abort the run before anything is written.
pub fn run_fix(
    settings: &FixSettings,
    repo: &dyn RepoView,
    writer: &dyn ManifestWriter,
) -> Result<FixReport, TameError> {
    let (workspace, _catalog, reconciliation) = analyze(&settings.check, repo)?;

    if !reconciliation.errors.is_empty() {
        return Err(ResolutionFailure {
            errors: reconciliation.errors,
        }
        .into());
    }

    let options = FixOptions {
        dry_run: settings.dry_run,
        jobs: settings.check.jobs,
    };
    let report = apply_fixes(&workspace, &reconciliation.violations, writer, &options)?;
    Ok(report)
}

fn analyze(
    settings: &CheckSettings,
    repo: &dyn RepoView,
) -> Result<(Workspace, Catalog, Reconciliation), TameError> {
    debug!(root = %repo.root(), mode = %settings.mode, "analyzing workspace");
    let workspace = scan(repo, &settings.scan_options())?;
    let catalog = resolve_catalog(&workspace)?;
    let reconciliation = reconcile(&workspace, &catalog, settings.mode);
    info!(
        packages = workspace.members.len(),
        catalog_entries = catalog.entry_count(),
        violations = reconciliation.violations.len(),
        unresolved = reconciliation.errors.len(),
        "analysis complete"
    );
    Ok((workspace, catalog, reconciliation))
}
