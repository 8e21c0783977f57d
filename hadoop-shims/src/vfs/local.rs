//! Local-disk backend for the virtual path abstraction.

use std::path::{Path, PathBuf};

use super::{FileKind, VfsError, VfsFile};

/// A path on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    /// Create a handle for the given path. The path does not need to exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The underlying OS path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> VfsError {
        VfsError::Io {
            url: self.url(),
            source,
        }
    }
}

impl VfsFile for LocalFile {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn kind(&self) -> FileKind {
        if self.path.is_dir() {
            FileKind::Folder
        } else if self.path.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        }
    }

    fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn child(&self, name: &str) -> Option<Box<dyn VfsFile>> {
        let child = self.path.join(name);
        if child.exists() {
            Some(Box::new(LocalFile::new(child)))
        } else {
            None
        }
    }

    fn resolve(&self, relative: &str) -> Result<Box<dyn VfsFile>, VfsError> {
        let target = Path::new(relative);
        let resolved = if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.path.join(target)
        };
        Ok(Box::new(LocalFile::new(resolved)))
    }

    fn children(&self) -> Result<Vec<Box<dyn VfsFile>>, VfsError> {
        let entries = std::fs::read_dir(&self.path).map_err(|e| self.io_error(e))?;
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error(e))?;
            paths.push(entry.path());
        }
        // Deterministic enumeration order regardless of the OS.
        paths.sort();
        Ok(paths
            .into_iter()
            .map(|p| Box::new(LocalFile::new(p)) as Box<dyn VfsFile>)
            .collect())
    }

    fn read(&self) -> Result<Vec<u8>, VfsError> {
        std::fs::read(&self.path).map_err(|e| self.io_error(e))
    }

    fn clone_box(&self) -> Box<dyn VfsFile> {
        Box::new(self.clone())
    }

    fn as_local_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_kind_discrimination() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("data.txt"), b"hello").unwrap();

        let folder = LocalFile::new(temp.path());
        let file = LocalFile::new(temp.path().join("data.txt"));
        let missing = LocalFile::new(temp.path().join("nope"));

        assert_eq!(folder.kind(), FileKind::Folder);
        assert_eq!(file.kind(), FileKind::File);
        assert_eq!(missing.kind(), FileKind::Other);
        assert!(!missing.exists());
    }

    #[test]
    fn test_child_lookup() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.properties"), b"name=x").unwrap();

        let folder = LocalFile::new(temp.path());
        assert!(folder.child("config.properties").is_some());
        assert!(folder.child("other.properties").is_none());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let temp = TempDir::new().unwrap();
        let folder = LocalFile::new(temp.path());

        let rel = folder.resolve("lib/native").unwrap();
        assert_eq!(
            rel.as_local_path().unwrap(),
            temp.path().join("lib/native").as_path()
        );

        let abs = folder.resolve(temp.path().to_str().unwrap()).unwrap();
        assert_eq!(abs.as_local_path().unwrap(), temp.path());
    }

    #[test]
    fn test_children_sorted() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.txt"), b"").unwrap();
        std::fs::write(temp.path().join("a.txt"), b"").unwrap();
        std::fs::write(temp.path().join("c.txt"), b"").unwrap();

        let names: Vec<String> = LocalFile::new(temp.path())
            .children()
            .unwrap()
            .iter()
            .map(|f| f.base_name())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_read_file_bytes() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("data.bin"), b"\x01\x02").unwrap();

        let file = LocalFile::new(temp.path().join("data.bin"));
        assert_eq!(file.read().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let file = LocalFile::new("/definitely/not/here");
        assert!(matches!(file.read(), Err(VfsError::Io { .. })));
    }
}
