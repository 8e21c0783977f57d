//! File-system-provider bridge.
//!
//! A shim's `on_load` callback may register additional virtual-file providers
//! that the surrounding application can then resolve. Registrations are keyed
//! by the owning configuration so two distributions can ship providers for
//! the same scheme without clobbering each other; the first registration for
//! a scheme additionally becomes the process-wide default.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{VfsError, VfsFile};

/// A pluggable virtual-file provider for one URI scheme.
pub trait VfsProvider: Send + Sync {
    /// The scheme this provider serves, e.g. `hdfs`.
    fn scheme(&self) -> &str;

    /// Open the file named by `uri` (which carries this provider's scheme).
    fn open(&self, uri: &str) -> Result<Box<dyn VfsFile>, VfsError>;
}

#[derive(Default)]
struct BridgeState {
    /// scheme -> provider, per owning configuration id.
    by_config: HashMap<String, HashMap<String, Arc<dyn VfsProvider>>>,
    /// First provider registered for each scheme, across configurations.
    defaults: HashMap<String, Arc<dyn VfsProvider>>,
}

/// Shared registry of shim-supplied file providers.
///
/// Handed to every primary shim's `on_load`; registrations persist for the
/// lifetime of the process.
#[derive(Default)]
pub struct FileSystemBridge {
    state: RwLock<BridgeState>,
}

impl FileSystemBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider on behalf of the configuration `config_id`.
    ///
    /// Re-registering a scheme for the same configuration replaces the
    /// previous provider; the process-wide default for a scheme is whichever
    /// provider registered first.
    pub fn register_provider(&self, config_id: &str, provider: Arc<dyn VfsProvider>) {
        let scheme = provider.scheme().to_string();
        debug!(config = config_id, scheme = %scheme, "registering file provider");
        let mut state = self.state.write();
        state
            .by_config
            .entry(config_id.to_string())
            .or_default()
            .insert(scheme.clone(), Arc::clone(&provider));
        state.defaults.entry(scheme).or_insert(provider);
    }

    /// The provider a specific configuration registered for `scheme`.
    pub fn provider_for(&self, config_id: &str, scheme: &str) -> Option<Arc<dyn VfsProvider>> {
        self.state
            .read()
            .by_config
            .get(config_id)
            .and_then(|schemes| schemes.get(scheme))
            .cloned()
    }

    /// The first provider any configuration registered for `scheme`.
    pub fn default_provider(&self, scheme: &str) -> Option<Arc<dyn VfsProvider>> {
        self.state.read().defaults.get(scheme).cloned()
    }

    /// All schemes registered by a configuration, sorted.
    pub fn schemes_for(&self, config_id: &str) -> Vec<String> {
        let mut schemes: Vec<String> = self
            .state
            .read()
            .by_config
            .get(config_id)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        schemes.sort();
        schemes
    }

    /// Open `uri` through the provider the configuration registered for its
    /// scheme.
    pub fn open(&self, config_id: &str, uri: &str) -> Result<Box<dyn VfsFile>, VfsError> {
        let scheme = uri.split("://").next().unwrap_or_default();
        let provider =
            self.provider_for(config_id, scheme)
                .ok_or_else(|| VfsError::UnknownScheme {
                    scheme: scheme.to_string(),
                })?;
        provider.open(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::LocalFile;

    struct FixedProvider {
        scheme: String,
    }

    impl VfsProvider for FixedProvider {
        fn scheme(&self) -> &str {
            &self.scheme
        }

        fn open(&self, uri: &str) -> Result<Box<dyn VfsFile>, VfsError> {
            let path = uri.split("://").nth(1).unwrap_or_default();
            Ok(Box::new(LocalFile::new(path)))
        }
    }

    fn provider(scheme: &str) -> Arc<dyn VfsProvider> {
        Arc::new(FixedProvider {
            scheme: scheme.to_string(),
        })
    }

    #[test]
    fn test_register_and_lookup_by_config() {
        let bridge = FileSystemBridge::new();
        bridge.register_provider("cdh5", provider("hdfs"));

        assert!(bridge.provider_for("cdh5", "hdfs").is_some());
        assert!(bridge.provider_for("hdp2", "hdfs").is_none());
        assert_eq!(bridge.schemes_for("cdh5"), vec!["hdfs"]);
    }

    #[test]
    fn test_first_registration_wins_default() {
        let bridge = FileSystemBridge::new();
        let first = provider("hdfs");
        bridge.register_provider("cdh5", Arc::clone(&first));
        bridge.register_provider("hdp2", provider("hdfs"));

        let default = bridge.default_provider("hdfs").unwrap();
        assert!(Arc::ptr_eq(&default, &first));
    }

    #[test]
    fn test_open_unknown_scheme() {
        let bridge = FileSystemBridge::new();
        assert!(matches!(
            bridge.open("cdh5", "hdfs://cluster/file"),
            Err(VfsError::UnknownScheme { .. })
        ));
    }

    #[test]
    fn test_open_routes_through_provider() {
        let bridge = FileSystemBridge::new();
        bridge.register_provider("cdh5", provider("hdfs"));

        let file = bridge.open("cdh5", "hdfs:///tmp/part-00000").unwrap();
        assert_eq!(file.base_name(), "part-00000");
    }
}
