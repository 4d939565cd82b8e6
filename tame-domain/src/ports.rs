use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeMap;
use std::io;
use tame_types::WorkspaceError;
use tracing::warn;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Read-only repository access.
///
/// Paths are relative to [`RepoView::root`]. Implementations must be `Sync`
/// because member manifests are read from a worker pool.
pub trait RepoView: Sync {
    fn root(&self) -> &Utf8Path;

    fn read_to_string(&self, rel: &Utf8Path) -> io::Result<String>;

    fn exists(&self, rel: &Utf8Path) -> bool;

    /// Files matching the glob `pattern` (relative to the root), sorted.
    fn glob_files(&self, pattern: &str) -> Result<Vec<Utf8PathBuf>, WorkspaceError>;
}

/// File-system backed `RepoView`.
#[derive(Debug, Clone)]
pub struct FsRepoView {
    root: Utf8PathBuf,
}

impl FsRepoView {
    /// Leading `./` components and trailing separators are dropped from
    /// `root`, matching the paths `glob` hands back. An empty root becomes `.`.
    pub fn new(root: Utf8PathBuf) -> Self {
        let root: Utf8PathBuf = root
            .components()
            .filter(|c| !matches!(c, Utf8Component::CurDir))
            .collect();
        if root.as_str().is_empty() {
            Self {
                root: Utf8PathBuf::from("."),
            }
        } else {
            Self { root }
        }
    }

    fn is_cwd(&self) -> bool {
        self.root.as_str() == "."
    }

    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl RepoView for FsRepoView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_to_string(&self, rel: &Utf8Path) -> io::Result<String> {
        fs::read_to_string(self.abs(rel))
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).exists()
    }

    fn glob_files(&self, pattern: &str) -> Result<Vec<Utf8PathBuf>, WorkspaceError> {
        let full = if self.is_cwd() {
            pattern.to_string()
        } else {
            format!("{}/{}", Pattern::escape(self.root.as_str()), pattern)
        };
        let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| {
            WorkspaceError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.msg.to_string(),
            }
        })?;

        let mut out = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| {
                let path = Utf8PathBuf::from(e.path().to_string_lossy().into_owned());
                WorkspaceError::Unreadable {
                    path,
                    source: e.into_error(),
                }
            })?;
            let Ok(path) = Utf8PathBuf::from_path_buf(path) else {
                warn!(pattern, "skipping non UTF-8 path");
                continue;
            };
            if !path.is_file() {
                continue;
            }
            if self.is_cwd() {
                out.push(path);
                continue;
            }
            let rel = path.strip_prefix(&self.root).map_err(|_| WorkspaceError::Unreadable {
                source: io::Error::other(format!("glob match escaped the workspace root {}", self.root)),
                path: path.clone(),
            })?;
            out.push(rel.to_path_buf());
        }
        out.sort();
        Ok(out)
    }
}

/// In-memory `RepoView` keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepoView {
    root: Utf8PathBuf,
    files: BTreeMap<Utf8PathBuf, String>,
}

impl InMemoryRepoView {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, rel: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(rel, contents);
        self
    }

    pub fn insert(&mut self, rel: impl Into<Utf8PathBuf>, contents: impl Into<String>) {
        self.files.insert(rel.into(), contents.into());
    }
}

impl RepoView for InMemoryRepoView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_to_string(&self, rel: &Utf8Path) -> io::Result<String> {
        self.files.get(rel).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{rel} does not exist"))
        })
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.files.contains_key(rel)
    }

    fn glob_files(&self, pattern: &str) -> Result<Vec<Utf8PathBuf>, WorkspaceError> {
        let pat = Pattern::new(pattern).map_err(|e| WorkspaceError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;
        Ok(self
            .files
            .keys()
            .filter(|p| pat.matches_with(p.as_str(), MATCH_OPTIONS))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn in_memory_glob_respects_separators() {
        let repo = InMemoryRepoView::new("/repo")
            .with_file("packages/a/package.json", "{}")
            .with_file("packages/a/nested/package.json", "{}")
            .with_file("packages/b/package.json", "{}");
        let found = repo.glob_files("packages/*/package.json").unwrap();
        assert_eq!(
            found,
            vec![
                Utf8PathBuf::from("packages/a/package.json"),
                Utf8PathBuf::from("packages/b/package.json"),
            ]
        );
        let deep = repo.glob_files("packages/**/package.json").unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn invalid_glob_is_reported() {
        let repo = InMemoryRepoView::new("/repo");
        let err = repo.glob_files("packages/[").unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidPattern { .. }));
    }

    #[test]
    fn fs_repo_view_globs_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("pkgs/one")).unwrap();
        fs::create_dir_all(root.join("pkgs/two")).unwrap();
        fs::write(root.join("pkgs/one/package.json"), "{}").unwrap();
        fs::write(root.join("pkgs/two/README.md"), "").unwrap();

        let repo = FsRepoView::new(root);
        assert_eq!(
            repo.glob_files("pkgs/*/package.json").unwrap(),
            vec![Utf8PathBuf::from("pkgs/one/package.json")]
        );
        assert!(repo.exists("pkgs/one/package.json".as_ref()));
        assert!(repo.read_to_string("pkgs/two/package.json".as_ref()).is_err());
    }

    #[test]
    fn fs_repo_view_normalizes_dot_prefixed_roots() {
        for (given, want) in [("./ws", "ws"), ("./ws/", "ws"), ("ws/", "ws"), ("./", "."), ("", "."), ("/abs/./ws/", "/abs/ws")] {
            let repo = FsRepoView::new(Utf8PathBuf::from(given));
            assert_eq!(repo.root(), Utf8Path::new(want), "root {given:?}");
        }
    }

    #[test]
    fn fs_repo_view_globs_under_dot_prefixed_root() {
        let tmp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        fs::create_dir_all(base.join("ws/pkgs/one")).unwrap();
        fs::write(base.join("ws/pkgs/one/package.json"), "{}").unwrap();

        // Relative roots resolve against the process cwd, so go through the
        // absolute form with an explicit `.` component.
        let repo = FsRepoView::new(base.join("ws").join("."));
        let found = repo.glob_files("pkgs/*/package.json").unwrap();
        assert_eq!(found, vec![Utf8PathBuf::from("pkgs/one/package.json")]);
        assert!(repo.exists(&found[0]));
    }
}
