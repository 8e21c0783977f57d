//! Virtual path abstraction.
//!
//! Configuration discovery never touches `std::fs` directly; every directory
//! and file is reached through the [`VfsFile`] trait so the same locator code
//! works over local disk and over remote or archived backings. The trait is
//! intentionally minimal: existence, type discrimination, child lookup,
//! selector-driven traversal, a friendly URL rendering and byte content.

mod local;

pub mod bridge;

pub use local::LocalFile;

use std::path::Path;

use thiserror::Error;

/// Errors raised by virtual filesystem backends.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The file or directory does not exist.
    #[error("file does not exist: {url}")]
    NotFound { url: String },

    /// A folder was required but something else was found.
    #[error("not a folder: {url}")]
    NotAFolder { url: String },

    /// I/O error from the underlying backend.
    #[error("I/O error at {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// No provider is registered for the requested URI scheme.
    #[error("no file provider registered for scheme '{scheme}'")]
    UnknownScheme { scheme: String },
}

/// Type discriminator for a virtual path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A directory that can be enumerated.
    Folder,
    /// A regular file with byte content.
    File,
    /// Anything else, including paths that do not exist.
    Other,
}

/// A path in a virtual filesystem.
///
/// Implementations must be cheap to clone via [`VfsFile::clone_box`]; handles
/// are identity-free descriptors, not open files.
pub trait VfsFile: Send + Sync {
    /// Whether the path currently exists.
    fn exists(&self) -> bool;

    /// Folder, file or other (non-existent paths report [`FileKind::Other`]).
    fn kind(&self) -> FileKind;

    /// The last component of the path.
    fn base_name(&self) -> String;

    /// A friendly URL for diagnostics (`file://...` for local paths).
    fn url(&self) -> String;

    /// Direct child by simple name, or `None` if no such child exists.
    fn child(&self, name: &str) -> Option<Box<dyn VfsFile>>;

    /// Resolve a relative (or absolute) path against this one. The result may
    /// describe a path that does not exist; callers check [`VfsFile::exists`].
    fn resolve(&self, relative: &str) -> Result<Box<dyn VfsFile>, VfsError>;

    /// Enumerate direct children in the backend's deterministic order.
    fn children(&self) -> Result<Vec<Box<dyn VfsFile>>, VfsError>;

    /// Read the full byte content of a regular file.
    fn read(&self) -> Result<Vec<u8>, VfsError>;

    /// Clone this handle.
    fn clone_box(&self) -> Box<dyn VfsFile>;

    /// The local OS path backing this file, if any. Code loading needs a real
    /// path to hand to the dynamic linker; purely virtual backends return
    /// `None`.
    fn as_local_path(&self) -> Option<&Path> {
        None
    }
}

/// Context handed to a [`FileSelector`] for each candidate.
pub struct FileSelectInfo<'a> {
    /// The candidate file or folder.
    pub file: &'a dyn VfsFile,
    /// Depth below the traversal root; the root itself is depth 0.
    pub depth: usize,
}

/// Include/descend predicate pair driving [`find_files`].
pub trait FileSelector {
    /// Whether the candidate belongs in the result set.
    fn include(&self, info: &FileSelectInfo<'_>) -> bool;

    /// Whether traversal should descend into the candidate folder.
    fn descend(&self, info: &FileSelectInfo<'_>) -> bool;
}

/// Recursively collect files under `root` according to `selector`.
///
/// The root is itself a candidate at depth 0. Traversal only descends into
/// folders for which [`FileSelector::descend`] answers `true`, so selectors
/// bound the walk instead of the walk enumerating everything up front.
pub fn find_files(
    root: &dyn VfsFile,
    selector: &dyn FileSelector,
) -> Result<Vec<Box<dyn VfsFile>>, VfsError> {
    let mut found = Vec::new();
    visit(root, 0, selector, &mut found)?;
    Ok(found)
}

fn visit(
    file: &dyn VfsFile,
    depth: usize,
    selector: &dyn FileSelector,
    found: &mut Vec<Box<dyn VfsFile>>,
) -> Result<(), VfsError> {
    let info = FileSelectInfo { file, depth };
    if selector.include(&info) {
        found.push(file.clone_box());
    }
    if file.kind() == FileKind::Folder && selector.descend(&info) {
        for child in file.children()? {
            visit(&*child, depth + 1, selector, found)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FoldersAtDepthOne;

    impl FileSelector for FoldersAtDepthOne {
        fn include(&self, info: &FileSelectInfo<'_>) -> bool {
            info.depth == 1 && info.file.kind() == FileKind::Folder
        }

        fn descend(&self, info: &FileSelectInfo<'_>) -> bool {
            info.depth == 0
        }
    }

    #[test]
    fn test_find_files_depth_one_folders() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("a")).unwrap();
        std::fs::create_dir_all(temp.path().join("b/nested")).unwrap();
        std::fs::write(temp.path().join("stray.txt"), b"x").unwrap();

        let root = LocalFile::new(temp.path());
        let found = find_files(&root, &FoldersAtDepthOne).unwrap();

        let names: Vec<String> = found.iter().map(|f| f.base_name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_find_files_does_not_descend_when_denied() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("a/inner")).unwrap();

        let root = LocalFile::new(temp.path());
        let found = find_files(&root, &FoldersAtDepthOne).unwrap();

        // "inner" sits at depth 2 and must not be reached.
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].base_name(), "a");
    }
}
