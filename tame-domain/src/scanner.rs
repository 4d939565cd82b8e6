use crate::ports::RepoView;
use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use rayon::prelude::*;
use std::collections::BTreeSet;
use tame_manifest::{Dialect, Document, Node, ScalarKind};
use tame_types::{DependencySection, DependencySpec, TameError, WorkspaceError, WorkspaceFlavor};
use tracing::{debug, info, warn};

/// Always excluded from member expansion.
pub const DEFAULT_EXCLUDE: &str = "**/node_modules/**";

const PACKAGE_JSON: &str = "package.json";

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Dependency sections to read; scanned in [`DependencySection::ALL`] order.
    pub sections: Vec<DependencySection>,
    /// Worker threads for parsing member manifests. `None` uses available parallelism.
    pub jobs: Option<usize>,
    /// Extra exclusion globs, matched against member directories.
    pub exclude: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            sections: DependencySection::ALL.to_vec(),
            jobs: None,
            exclude: Vec::new(),
        }
    }
}

/// A member package and its parsed manifest.
#[derive(Debug, Clone)]
pub struct Package {
    /// Directory relative to the workspace root; empty for the root package.
    pub dir: Utf8PathBuf,
    /// Manifest path relative to the workspace root.
    pub manifest_path: Utf8PathBuf,
    pub name: Option<String>,
    pub manifest: Document,
    /// Unique by (section, name), in declaration order.
    pub dependencies: Vec<DependencySpec>,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: Utf8PathBuf,
    pub flavor: WorkspaceFlavor,
    /// Relative to `root`.
    pub root_manifest_path: Utf8PathBuf,
    pub root_manifest: Document,
    pub members: Vec<Package>,
}

/// Discovers the workspace under `repo.root()` and parses every member.
pub fn scan(repo: &dyn RepoView, options: &ScanOptions) -> Result<Workspace, TameError> {
    let root = repo.root().to_path_buf();
    let (flavor, root_manifest) = detect_root(repo)?;
    let root_manifest_path = Utf8PathBuf::from(flavor.root_manifest());
    debug!(%root, ?flavor, "detected workspace");

    let patterns = member_patterns(flavor, &root_manifest, &root.join(&root_manifest_path))?;
    let mut includes = Vec::new();
    let mut excludes = vec![compile(DEFAULT_EXCLUDE)?];
    for pattern in &patterns {
        match pattern.strip_prefix('!') {
            Some(neg) => excludes.push(compile(&normalize(neg))?),
            None => includes.push(normalize(pattern)),
        }
    }
    for pattern in &options.exclude {
        excludes.push(compile(&normalize(pattern))?);
    }

    let manifests = expand_members(repo, &includes, &excludes)?;
    debug!(count = manifests.len(), "expanded member manifests");

    let sections: Vec<DependencySection> = DependencySection::ALL
        .into_iter()
        .filter(|s| options.sections.contains(s))
        .collect();
    let members = load_members(repo, &manifests, &sections, options.jobs)?;

    info!(
        %root,
        packages = members.len(),
        "scanned workspace"
    );

    Ok(Workspace {
        root,
        flavor,
        root_manifest_path,
        root_manifest,
        members,
    })
}

fn detect_root(repo: &dyn RepoView) -> Result<(WorkspaceFlavor, Document), TameError> {
    let pnpm = Utf8Path::new(WorkspaceFlavor::Pnpm.root_manifest());
    if repo.exists(pnpm) {
        let doc = read_document(repo, pnpm, Dialect::Yaml)?;
        return Ok((WorkspaceFlavor::Pnpm, doc));
    }

    let package_json = Utf8Path::new(PACKAGE_JSON);
    if repo.exists(package_json) {
        let doc = read_document(repo, package_json, Dialect::Json)?;
        if doc.get(&["workspaces"]).is_some() {
            return Ok((WorkspaceFlavor::PackageJson, doc));
        }
    }

    Err(WorkspaceError::RootManifestMissing {
        root: repo.root().to_path_buf(),
    }
    .into())
}

fn read_document(repo: &dyn RepoView, rel: &Utf8Path, dialect: Dialect) -> Result<Document, TameError> {
    let abs = repo.root().join(rel);
    let text = repo
        .read_to_string(rel)
        .map_err(|source| WorkspaceError::Unreadable {
            path: abs.clone(),
            source,
        })?;
    Document::parse(dialect, &text).map_err(|e| TameError::Parse(e.with_path(abs)))
}

fn member_patterns(
    flavor: WorkspaceFlavor,
    doc: &Document,
    manifest: &Utf8Path,
) -> Result<Vec<String>, WorkspaceError> {
    let (node, field, expected) = match flavor {
        WorkspaceFlavor::Pnpm => (doc.get(&["packages"]), "packages", "a list of glob strings"),
        WorkspaceFlavor::PackageJson => match doc.get(&["workspaces"]) {
            Some(Node::Map(_)) => (
                doc.get(&["workspaces", "packages"]),
                "workspaces.packages",
                "an array of glob strings",
            ),
            other => (
                other,
                "workspaces",
                "an array of glob strings or an object with `packages`",
            ),
        },
    };

    let invalid = || WorkspaceError::InvalidField {
        manifest: manifest.to_path_buf(),
        field: field.to_string(),
        expected,
    };

    let patterns = match node {
        None => Vec::new(),
        Some(n) if n.is_null() => Vec::new(),
        Some(Node::Seq(seq)) => seq
            .items
            .iter()
            .map(|item| match item.as_scalar() {
                Some(s) if !s.text.trim().is_empty() => Ok(s.text.trim().to_string()),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid()),
    };

    if patterns.iter().all(|p| p.starts_with('!')) {
        return Err(WorkspaceError::NoMembers {
            manifest: manifest.to_path_buf(),
        });
    }
    Ok(patterns)
}

fn normalize(pattern: &str) -> String {
    let mut p = pattern.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    match p.trim_end_matches('/') {
        "" => ".".to_string(),
        p => p.to_string(),
    }
}

fn compile(pattern: &str) -> Result<Pattern, WorkspaceError> {
    Pattern::new(pattern).map_err(|e| WorkspaceError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })
}

fn is_excluded(manifest: &Utf8Path, excludes: &[Pattern]) -> bool {
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };
    // The root package's directory is matched as `.`.
    let dir = match manifest.parent().map(Utf8Path::as_str) {
        Some("") | None => ".",
        Some(dir) => dir,
    };
    excludes
        .iter()
        .any(|p| p.matches_with(dir, options) || p.matches_with(manifest.as_str(), options))
}

/// Root package first, then pattern order; first position wins for duplicates.
fn expand_members(
    repo: &dyn RepoView,
    includes: &[String],
    excludes: &[Pattern],
) -> Result<Vec<Utf8PathBuf>, WorkspaceError> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();

    let root_manifest = Utf8PathBuf::from(PACKAGE_JSON);
    if repo.exists(&root_manifest) {
        if is_excluded(&root_manifest, excludes) {
            debug!(manifest = %root_manifest, "excluded");
        } else {
            out.push(root_manifest.clone());
        }
        seen.insert(root_manifest);
    }

    for pattern in includes {
        let target = if pattern.is_empty() || pattern == "." {
            PACKAGE_JSON.to_string()
        } else {
            format!("{pattern}/{PACKAGE_JSON}")
        };
        let found = repo.glob_files(&target)?;
        if found.is_empty() {
            warn!(pattern = %pattern, "workspace pattern matched no packages");
        }
        for manifest in found {
            if is_excluded(&manifest, excludes) {
                debug!(%manifest, "excluded");
                continue;
            }
            if seen.insert(manifest.clone()) {
                out.push(manifest);
            }
        }
    }

    Ok(out)
}

fn load_members(
    repo: &dyn RepoView,
    manifests: &[Utf8PathBuf],
    sections: &[DependencySection],
    jobs: Option<usize>,
) -> Result<Vec<Package>, TameError> {
    let jobs = jobs.filter(|&j| j > 0).unwrap_or_else(default_jobs);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| WorkspaceError::WorkerPool {
            message: e.to_string(),
        })?;

    let results: Vec<Result<Package, TameError>> = pool.install(|| {
        manifests
            .par_iter()
            .map(|manifest| load_package(repo, manifest, sections))
            .collect()
    });
    results.into_iter().collect()
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn load_package(
    repo: &dyn RepoView,
    manifest_path: &Utf8Path,
    sections: &[DependencySection],
) -> Result<Package, TameError> {
    let manifest = read_document(repo, manifest_path, Dialect::Json)?;
    let name = manifest.get_str(&["name"]).map(str::to_string);
    let dependencies = collect_dependencies(&manifest, manifest_path, sections);
    debug!(
        manifest = %manifest_path,
        dependencies = dependencies.len(),
        "parsed package"
    );

    Ok(Package {
        dir: manifest_path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default(),
        manifest_path: manifest_path.to_path_buf(),
        name,
        manifest,
        dependencies,
    })
}

fn collect_dependencies(
    manifest: &Document,
    manifest_path: &Utf8Path,
    sections: &[DependencySection],
) -> Vec<DependencySpec> {
    let mut out = Vec::new();
    for &section in sections {
        let Some(node) = manifest.get(&[section.key()]) else {
            continue;
        };
        let Some(table) = node.as_map() else {
            warn!(manifest = %manifest_path, %section, "dependency section is not an object; skipping");
            continue;
        };

        let first = out.len();
        for entry in &table.entries {
            let Some(raw) = entry
                .value
                .as_scalar()
                .filter(|s| s.kind == ScalarKind::String)
            else {
                warn!(
                    manifest = %manifest_path,
                    %section,
                    dependency = %entry.key,
                    "dependency version is not a string; skipping"
                );
                continue;
            };
            let spec = DependencySpec::new(section, entry.key.as_str(), &raw.text);
            // Duplicate keys: keep the first position, take the last value.
            match out[first..].iter().position(|d: &DependencySpec| d.name == entry.key) {
                Some(i) => out[first + i] = spec,
                None => out.push(spec),
            }
        }
    }
    out
}
