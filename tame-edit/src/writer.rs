use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;
use tame_types::WriteError;
use tracing::debug;

/// Persists rewritten manifests.
pub trait ManifestWriter: Sync {
    fn write_manifest(&self, path: &Utf8Path, contents: &str) -> Result<(), WriteError>;
}

/// Writes to a temporary file next to the target, copies the target's
/// permissions onto it, then renames it over the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicFsWriter;

impl ManifestWriter for AtomicFsWriter {
    fn write_manifest(&self, path: &Utf8Path, contents: &str) -> Result<(), WriteError> {
        let io_err = |source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let permissions = fs::metadata(path).map(|m| m.permissions()).ok();

        let mut tmp = tempfile::Builder::new()
            .prefix(".tame-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_err)?;
        tmp.write_all(contents.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        if let Some(permissions) = permissions {
            fs::set_permissions(tmp.path(), permissions).map_err(io_err)?;
        }
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        debug!(%path, bytes = contents.len(), "wrote manifest");
        Ok(())
    }
}

/// Records writes in memory instead of touching the file system.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: Mutex<BTreeMap<Utf8PathBuf, String>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, keyed by path.
    pub fn written(&self) -> BTreeMap<Utf8PathBuf, String> {
        self.files
            .lock()
            .map(|files| files.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ManifestWriter for MemoryWriter {
    fn write_manifest(&self, path: &Utf8Path, contents: &str) -> Result<(), WriteError> {
        let mut files = self
            .files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        (tmp, root)
    }

    #[test]
    fn atomic_writer_replaces_contents() {
        let (_tmp, root) = utf8_tempdir();
        let path = root.join("package.json");
        fs::write(&path, "{}").unwrap();

        AtomicFsWriter.write_manifest(&path, "{\"a\":1}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}\n");

        let leftovers: Vec<_> = fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().starts_with(".tame-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn atomic_writer_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, root) = utf8_tempdir();
        let path = root.join("package.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        AtomicFsWriter.write_manifest(&path, "{ }").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn atomic_writer_reports_missing_directory() {
        let (_tmp, root) = utf8_tempdir();
        let path = root.join("missing/package.json");
        let err = AtomicFsWriter.write_manifest(&path, "{}").unwrap_err();
        assert_eq!(err.path(), &path);
    }

    #[test]
    fn memory_writer_records() {
        let writer = MemoryWriter::new();
        writer.write_manifest(Utf8Path::new("a/package.json"), "x").unwrap();
        assert_eq!(writer.written().get(Utf8Path::new("a/package.json")).map(String::as_str), Some("x"));
    }
}
