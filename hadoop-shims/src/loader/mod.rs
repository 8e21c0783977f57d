//! Isolated code-loading scopes for shim bundles.
//!
//! Each configuration directory gets its own [`ShimLoader`]: an ordered list
//! of bundle roots (resource directories and shim dynamic libraries) with a
//! controlled delegation policy towards the host scope. A shim ships its own
//! versions of collision-prone infrastructure, so names matching one of the
//! configured ignored prefixes resolve strictly within the scope and are
//! never delegated; everything else is host-first so shared contracts keep a
//! single identity.

pub mod classpath;
pub mod library;
pub mod native;
pub mod services;

pub use classpath::{find_libraries_in, is_dynamic_lib, parse_classpath};
pub use library::{BundleLibraryLoader, LoadedLibrary, NativeLibraryLoader};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::shim::{ShimError, ShimFactory, ShimKind, ShimRegistry};
use crate::vfs::{FileKind, VfsError, VfsFile};

/// Errors raised while building or querying a loading scope.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The named resource is not visible in this scope.
    #[error("resource not found in configuration scope: {name}")]
    ResourceNotFound { name: String },

    /// No factory is registered for the implementation name.
    #[error("unknown shim implementation: {name}")]
    ImplementationNotFound { name: String },

    /// The declared implementation satisfies a different contract.
    #[error("implementation '{name}' does not provide the {expected} contract")]
    ContractMismatch { name: String, expected: ShimKind },

    /// A bundle library could not be loaded or registered.
    #[error("failed to load shim library {url}: {reason}")]
    Library { url: String, reason: String },

    /// A declared implementation's factory failed.
    #[error("failed to instantiate shim implementation '{name}'")]
    Instantiation {
        name: String,
        #[source]
        source: ShimError,
    },

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

/// One entry on a scope's ordered search path.
pub enum BundleRoot {
    /// A directory serving resources by relative name.
    Dir(Box<dyn VfsFile>),
    /// A dynamic library contributing shim factories.
    Library(Box<dyn VfsFile>),
    /// A plain file kept visible on the search path; contributes neither
    /// resources nor code.
    File(Box<dyn VfsFile>),
}

impl BundleRoot {
    /// URL view of the entry; directory URLs carry a trailing separator so
    /// they read as directory roots.
    pub fn url(&self) -> String {
        match self {
            BundleRoot::Dir(file) => {
                let url = file.url();
                if url.ends_with('/') {
                    url
                } else {
                    format!("{url}/")
                }
            }
            BundleRoot::Library(file) | BundleRoot::File(file) => file.url(),
        }
    }

    pub fn file(&self) -> &dyn VfsFile {
        match self {
            BundleRoot::Dir(file) | BundleRoot::Library(file) | BundleRoot::File(file) => &**file,
        }
    }
}

impl fmt::Debug for BundleRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleRoot::Dir(_) => write!(f, "Dir({})", self.url()),
            BundleRoot::Library(_) => write!(f, "Library({})", self.url()),
            BundleRoot::File(_) => write!(f, "File({})", self.url()),
        }
    }
}

/// The parent scope a [`ShimLoader`] delegates to.
///
/// Stands in for everything the embedding application itself links: factories
/// for built-in implementations and resources it wants visible to every
/// configuration.
#[derive(Default)]
pub struct HostScope {
    registry: ShimRegistry,
    resources: HashMap<String, Vec<u8>>,
}

impl HostScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factories the host provides; shims resolve these unless shadowed by an
    /// ignored prefix.
    pub fn registry_mut(&mut self) -> &mut ShimRegistry {
        &mut self.registry
    }

    /// Publish a resource to every child scope.
    pub fn register_resource(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.resources.insert(name.into(), bytes.into());
    }

    fn factory(&self, name: &str) -> Option<&ShimFactory> {
        self.registry.get(name)
    }

    fn resource(&self, name: &str) -> Option<&[u8]> {
        self.resources.get(name).map(Vec::as_slice)
    }
}

/// An isolating loading scope over an ordered bundle-root list.
///
/// Earlier roots shadow later ones. Library handles loaded for this scope
/// stay alive as long as the scope does, which in practice is until process
/// exit since configurations are never torn down.
pub struct ShimLoader {
    entries: Vec<BundleRoot>,
    host: Arc<HostScope>,
    ignored: Vec<String>,
    local: ShimRegistry,
    _libraries: Vec<LoadedLibrary>,
}

impl ShimLoader {
    /// Build a scope from its search path.
    ///
    /// Every [`BundleRoot::Library`] entry is loaded eagerly, in search
    /// order, and given the chance to register factories; first registration
    /// of a name wins. A library that cannot be loaded fails the whole scope,
    /// which the configuration loader reports as a per-candidate error.
    pub fn new(
        entries: Vec<BundleRoot>,
        host: Arc<HostScope>,
        ignored: Vec<String>,
        library_loader: &dyn BundleLibraryLoader,
    ) -> Result<Self, LoaderError> {
        let ignored: Vec<String> = ignored
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let mut local = ShimRegistry::new();
        let mut libraries = Vec::new();
        for entry in &entries {
            if let BundleRoot::Library(file) = entry {
                debug!(url = %file.url(), "loading shim bundle library");
                libraries.push(library_loader.load(&**file, &mut local)?);
            }
        }

        Ok(Self {
            entries,
            host,
            ignored,
            local,
            _libraries: libraries,
        })
    }

    /// Whether a name falls under one of the ignored prefixes and must be
    /// resolved strictly locally.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|prefix| name.starts_with(prefix))
    }

    /// The ignored prefixes, post-normalization.
    pub fn ignored_prefixes(&self) -> &[String] {
        &self.ignored
    }

    /// URL view of the search path, in resolution order.
    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(BundleRoot::url).collect()
    }

    /// Read a resource by slash-separated relative name.
    ///
    /// Ignored names never consult the host; all other names are host-first.
    pub fn read_resource(&self, name: &str) -> Result<Vec<u8>, LoaderError> {
        if self.is_ignored(name) {
            return self
                .read_local_resource(name)
                .ok_or_else(|| LoaderError::ResourceNotFound {
                    name: name.to_string(),
                });
        }
        if let Some(bytes) = self.host.resource(name) {
            return Ok(bytes.to_vec());
        }
        self.read_local_resource(name)
            .ok_or_else(|| LoaderError::ResourceNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve an implementation name to its factory under the scope's
    /// delegation policy.
    pub fn resolve_factory(&self, name: &str) -> Result<ShimFactory, LoaderError> {
        let resolved = if self.is_ignored(name) {
            self.local.get(name)
        } else {
            self.host.factory(name).or_else(|| self.local.get(name))
        };
        resolved
            .cloned()
            .ok_or_else(|| LoaderError::ImplementationNotFound {
                name: name.to_string(),
            })
    }

    fn read_local_resource(&self, name: &str) -> Option<Vec<u8>> {
        for entry in &self.entries {
            if let BundleRoot::Dir(dir) = entry {
                let Ok(file) = dir.resolve(name) else {
                    continue;
                };
                if file.kind() == FileKind::File {
                    if let Ok(bytes) = file.read() {
                        return Some(bytes);
                    }
                }
            }
        }
        None
    }
}

impl fmt::Debug for ShimLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShimLoader")
            .field("urls", &self.urls())
            .field("ignored", &self.ignored)
            .field("local", &self.local)
            .finish()
    }
}
