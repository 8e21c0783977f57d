//! Dynamic loading of shim bundle libraries.

use libloading::Library;
use tracing::debug;

use super::LoaderError;
use crate::shim::ShimRegistry;
use crate::vfs::VfsFile;

/// Entry point every shim bundle library exports.
///
/// Called once, right after the library is mapped, with the scope's local
/// registry. The bundle registers its factories under their implementation
/// names.
pub const BUNDLE_REGISTER_SYMBOL: &str = "hadoop_shim_bundle_register";

/// Signature of [`BUNDLE_REGISTER_SYMBOL`].
pub type BundleRegisterFn = unsafe extern "C" fn(&mut ShimRegistry);

/// A bundle library kept alive for the lifetime of its scope.
///
/// Dropping the handle would unmap the library and dangle every factory it
/// registered, so scopes hold these until they are themselves dropped.
#[derive(Debug)]
pub struct LoadedLibrary {
    _handle: Option<Library>,
}

impl LoadedLibrary {
    fn native(lib: Library) -> Self {
        Self { _handle: Some(lib) }
    }

    /// A placeholder with no OS handle behind it, for loaders that register
    /// factories by other means.
    pub fn unbacked() -> Self {
        Self { _handle: None }
    }
}

/// How a scope turns a bundle library file into registered factories.
///
/// The production implementation is [`NativeLibraryLoader`]; tests substitute
/// their own to avoid building real dynamic libraries.
pub trait BundleLibraryLoader: Send + Sync {
    fn load(
        &self,
        file: &dyn VfsFile,
        registry: &mut ShimRegistry,
    ) -> Result<LoadedLibrary, LoaderError>;
}

/// Loads bundle libraries through the OS dynamic linker.
#[derive(Debug, Default)]
pub struct NativeLibraryLoader;

impl NativeLibraryLoader {
    pub fn new() -> Self {
        Self
    }
}

impl BundleLibraryLoader for NativeLibraryLoader {
    fn load(
        &self,
        file: &dyn VfsFile,
        registry: &mut ShimRegistry,
    ) -> Result<LoadedLibrary, LoaderError> {
        let url = file.url();
        let path = file
            .as_local_path()
            .ok_or_else(|| LoaderError::Library {
                url: url.clone(),
                reason: "not backed by a local file".to_string(),
            })?;

        // Safety: bundle libraries are trusted configuration content; their
        // initializers run on load, as with any dlopen.
        let lib = unsafe { Library::new(path) }.map_err(|e| LoaderError::Library {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let entry: libloading::Symbol<'_, BundleRegisterFn> =
            unsafe { lib.get(b"hadoop_shim_bundle_register\0") }.map_err(|e| {
                LoaderError::Library {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            })?;

        // Safety: the symbol was resolved against BundleRegisterFn above.
        unsafe { entry(registry) };
        debug!(url = %url, registered = registry.len(), "shim bundle registered");

        Ok(LoadedLibrary::native(lib))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::LocalFile;
    use tempfile::TempDir;

    #[test]
    fn test_non_library_file_fails_with_reason() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shim.so");
        std::fs::write(&path, b"not an object file").unwrap();

        let mut registry = ShimRegistry::new();
        let err = NativeLibraryLoader::new()
            .load(&LocalFile::new(&path), &mut registry)
            .unwrap_err();
        assert!(matches!(err, LoaderError::Library { .. }));
        assert!(registry.is_empty());
    }
}
