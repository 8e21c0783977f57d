//! Process-wide native library search paths.
//!
//! A configuration's `library.path` property names directories that must be
//! visible to the dynamic linker before the configuration's bundle libraries
//! load. The OS linker's own search list cannot be extended at runtime, so
//! the registrar owns the list and [`locate_library`] resolves bare library
//! names against it. The list is append-only for the life of the process and
//! registration is deliberately best-effort: a bad entry earns one log line
//! and never rejects a configuration.

use std::path::PathBuf;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::warn;

use super::classpath::is_dynamic_lib;

static NATIVE_SEARCH_PATHS: OnceLock<Mutex<Vec<PathBuf>>> = OnceLock::new();

fn paths() -> &'static Mutex<Vec<PathBuf>> {
    NATIVE_SEARCH_PATHS.get_or_init(|| Mutex::new(Vec::new()))
}

/// Register a comma-separated list of native library directories.
///
/// Per-entry failures are logged and skipped; the call itself never fails.
pub fn register_native_library_paths(spec: &str) {
    for raw in spec.split(',') {
        let path = raw.trim();
        if !register_native_library_path(path) {
            warn!(path, "unable to register native library path");
        }
    }
}

/// Append one directory to the process-wide search list.
///
/// Idempotent: a path already on the list reports success without
/// modification. Returns `false` when the entry is empty or does not name
/// an existing directory.
pub fn register_native_library_path(path: &str) -> bool {
    let path = path.trim();
    if path.is_empty() {
        return false;
    }
    let entry = PathBuf::from(path);
    if !entry.is_dir() {
        return false;
    }
    let mut list = paths().lock();
    if list.iter().any(|p| p == &entry) {
        return true;
    }
    list.push(entry);
    true
}

/// Snapshot of the registered search paths, in registration order.
pub fn native_search_paths() -> Vec<PathBuf> {
    paths().lock().clone()
}

/// Resolve a library by bare name (`snappy`) or file name (`libsnappy.so`)
/// against the registered search paths. First hit wins.
pub fn locate_library(name: &str) -> Option<PathBuf> {
    let candidates = candidate_file_names(name);
    for dir in paths().lock().iter() {
        for candidate in &candidates {
            let path = dir.join(candidate);
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}

fn candidate_file_names(name: &str) -> Vec<String> {
    if is_dynamic_lib(name) {
        return vec![name.to_string()];
    }
    if cfg!(target_os = "windows") {
        vec![format!("{name}.dll")]
    } else if cfg!(target_os = "macos") {
        vec![format!("lib{name}.dylib"), format!("{name}.dylib")]
    } else {
        vec![format!("lib{name}.so"), format!("{name}.so")]
    }
}
