//! Classpath spec expansion.
//!
//! `config.properties` may carry a comma-separated `classpath` property whose
//! entries are prepended to a configuration's search path. Directory entries
//! contribute the directory itself plus any shim libraries directly inside
//! it; invalid entries are logged and skipped so one bad path never rejects
//! the whole configuration.

use tracing::{debug, warn};

use super::BundleRoot;
use crate::vfs::{FileKind, FileSelectInfo, FileSelector, VfsError, VfsFile, find_files};

/// Whether a file name looks like a platform dynamic library.
pub fn is_dynamic_lib(name: &str) -> bool {
    name.ends_with(".so") || name.ends_with(".dylib") || name.ends_with(".dll")
}

struct LibrarySelector {
    maxdepth: usize,
}

impl FileSelector for LibrarySelector {
    fn include(&self, info: &FileSelectInfo<'_>) -> bool {
        info.depth <= self.maxdepth
            && info.file.kind() == FileKind::File
            && is_dynamic_lib(&info.file.base_name())
    }

    fn descend(&self, info: &FileSelectInfo<'_>) -> bool {
        info.depth < self.maxdepth
    }
}

/// Find all shim dynamic libraries within `root`, at most `maxdepth` levels
/// below it.
pub fn find_libraries_in(
    root: &dyn VfsFile,
    maxdepth: usize,
) -> Result<Vec<Box<dyn VfsFile>>, VfsError> {
    find_files(root, &LibrarySelector { maxdepth })
}

/// Expand a comma-separated classpath spec against `root`.
///
/// Empty or whitespace-only specs produce an empty list. Entries that cannot
/// be resolved are logged and skipped; the parse never fails as a whole.
pub fn parse_classpath(root: &dyn VfsFile, spec: &str) -> Vec<BundleRoot> {
    if spec.trim().is_empty() {
        return Vec::new();
    }
    let mut roots = Vec::new();
    for raw in spec.split(',') {
        let entry = raw.trim();
        match resolve_entry(root, entry) {
            Ok(mut resolved) => roots.append(&mut resolved),
            Err(e) => warn!(entry, error = %e, "invalid classpath entry, ignoring"),
        }
    }
    roots
}

fn resolve_entry(root: &dyn VfsFile, entry: &str) -> Result<Vec<BundleRoot>, VfsError> {
    if entry.is_empty() {
        return Err(VfsError::NotFound {
            url: root.url(),
        });
    }
    let file = root.resolve(entry)?;
    if !file.exists() {
        return Err(VfsError::NotFound { url: file.url() });
    }
    match file.kind() {
        FileKind::Folder => {
            let libraries = find_libraries_in(&*file, 1)?;
            let mut roots = vec![BundleRoot::Dir(file)];
            roots.extend(libraries.into_iter().map(BundleRoot::Library));
            Ok(roots)
        }
        FileKind::File if is_dynamic_lib(&file.base_name()) => {
            Ok(vec![BundleRoot::Library(file)])
        }
        FileKind::File => {
            // Stays visible on the search path, but carries neither
            // resources nor code and is never handed to the dynamic linker.
            debug!(url = %file.url(), "classpath entry is not a shim library");
            Ok(vec![BundleRoot::File(file)])
        }
        FileKind::Other => Err(VfsError::NotFound { url: file.url() }),
    }
}
