use crate::scanner::{Package, Workspace};
use tame_types::{
    Catalog, CatalogLookupMiss, DeclaredForm, MissingReason, ReconcileMode, ResolutionError,
    Violation, ViolationKind, CATALOG_PROTOCOL,
};
use tracing::{debug, info};

/// Outcome of comparing every member against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub violations: Vec<Violation>,
    pub errors: Vec<ResolutionError>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.errors.is_empty()
    }
}

/// Compares each member's dependencies with `catalog`.
///
/// Pure: output order is package discovery order, then declaration order.
pub fn reconcile(workspace: &Workspace, catalog: &Catalog, mode: ReconcileMode) -> Reconciliation {
    let mut out = Reconciliation::default();
    for package in &workspace.members {
        reconcile_package(package, catalog, mode, &mut out);
    }
    info!(
        %mode,
        violations = out.violations.len(),
        errors = out.errors.len(),
        "reconciled workspace"
    );
    out
}

fn reconcile_package(package: &Package, catalog: &Catalog, mode: ReconcileMode, out: &mut Reconciliation) {
    debug!(dir = %package.dir, dependencies = package.dependencies.len(), "reconciling package");
    for dep in &package.dependencies {
        match &dep.declared {
            DeclaredForm::CatalogRef(name) => {
                if let Err(miss) = catalog.lookup(name, &dep.name) {
                    let reason = match miss {
                        CatalogLookupMiss::CatalogMissing => MissingReason::CatalogMissing,
                        CatalogLookupMiss::EntryMissing => MissingReason::EntryMissing,
                    };
                    debug!(manifest = %package.manifest_path, dependency = %dep.name, ?reason, "unresolved catalog reference");
                    out.errors.push(ResolutionError {
                        manifest: package.manifest_path.clone(),
                        section: dep.section,
                        dependency: dep.name.clone(),
                        catalog: name.clone(),
                        reason,
                    });
                }
            }
            DeclaredForm::Explicit(current) => {
                let Some(entry) = catalog.default.get(&dep.name) else {
                    continue;
                };
                let (kind, expected) = match mode {
                    ReconcileMode::Pin if *current == entry.constraint => continue,
                    ReconcileMode::Pin => (ViolationKind::Mismatch, entry.constraint.clone()),
                    ReconcileMode::Reference => (ViolationKind::NotReferenced, CATALOG_PROTOCOL.to_string()),
                };
                out.violations.push(Violation {
                    manifest: package.manifest_path.clone(),
                    section: dep.section,
                    dependency: dep.name.clone(),
                    key_path: dep.key_path.clone(),
                    kind,
                    current: current.clone(),
                    expected,
                    canonical: entry.constraint.clone(),
                });
            }
            DeclaredForm::Protocol(_) => {}
        }
    }
}
