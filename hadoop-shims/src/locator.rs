//! Discovery and registry of Hadoop configurations.
//!
//! The locator walks the immediate children of a base directory, treats each
//! child folder as a candidate distribution, and assembles those that carry a
//! primary shim into [`HadoopConfiguration`]s. A candidate that fails to
//! assemble is logged and skipped so one broken distribution never blocks the
//! rest. After [`HadoopConfigurationLocator::init`] the registry is
//! queryable by identifier and through the active-configuration resolver.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::HadoopConfiguration;
use crate::error::{ConfigurationError, LocatorResult};
use crate::loader::{
    find_libraries_in, native, parse_classpath, services, BundleLibraryLoader, BundleRoot,
    HostScope, NativeLibraryLoader, ShimLoader,
};
use crate::properties::Properties;
use crate::vfs::bridge::FileSystemBridge;
use crate::vfs::{find_files, FileKind, FileSelectInfo, FileSelector, VfsFile};

/// Per-configuration properties file name.
pub const CONFIG_PROPERTIES_FILE: &str = "config.properties";

/// Human-readable configuration name.
pub const PROPERTY_NAME: &str = "name";
/// Comma-separated classpath additions, relative to the configuration folder.
pub const PROPERTY_CLASSPATH: &str = "classpath";
/// Comma-separated native library directories.
pub const PROPERTY_LIBRARY_PATH: &str = "library.path";
/// Comma-separated name prefixes resolved strictly within the configuration.
pub const PROPERTY_IGNORE_CLASSES: &str = "ignore.classes";

/// Names the configuration that is currently active.
///
/// Consulted on every [`HadoopConfigurationLocator::get_active_configuration`]
/// call; the locator never caches the answer, so the selection can change at
/// runtime.
pub trait ActiveConfigurationResolver: Send + Sync {
    fn active_configuration_id(&self) -> String;
}

impl<F> ActiveConfigurationResolver for F
where
    F: Fn() -> String + Send + Sync,
{
    fn active_configuration_id(&self) -> String {
        self()
    }
}

/// Selects the immediate child folders of the base directory.
struct ConfigFolderSelector;

impl FileSelector for ConfigFolderSelector {
    fn include(&self, info: &FileSelectInfo<'_>) -> bool {
        info.depth == 1 && info.file.kind() == FileKind::Folder
    }

    fn descend(&self, info: &FileSelectInfo<'_>) -> bool {
        info.depth == 0
    }
}

pub struct HadoopConfigurationLocator {
    configurations: HashMap<String, Arc<HadoopConfiguration>>,
    initialized: bool,
    active_resolver: Option<Box<dyn ActiveConfigurationResolver>>,
    host: Arc<HostScope>,
    library_loader: Arc<dyn BundleLibraryLoader>,
}

impl Default for HadoopConfigurationLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HadoopConfigurationLocator {
    pub fn new() -> Self {
        Self {
            configurations: HashMap::new(),
            initialized: false,
            active_resolver: None,
            host: Arc::new(HostScope::new()),
            library_loader: Arc::new(NativeLibraryLoader::new()),
        }
    }

    /// Use a pre-populated host scope as the delegation parent for every
    /// configuration's loader.
    pub fn with_host_scope(mut self, host: Arc<HostScope>) -> Self {
        self.host = host;
        self
    }

    /// Substitute the mechanism that turns bundle library files into
    /// registered factories.
    pub fn with_library_loader(mut self, loader: Arc<dyn BundleLibraryLoader>) -> Self {
        self.library_loader = loader;
        self
    }

    /// Discover configurations under `base_dir` and build the registry.
    ///
    /// A second call replaces the registry wholesale; previously discovered
    /// configurations are dropped.
    pub fn init(
        &mut self,
        base_dir: &dyn VfsFile,
        active_resolver: Box<dyn ActiveConfigurationResolver>,
        bridge: Arc<FileSystemBridge>,
    ) -> LocatorResult<()> {
        if !base_dir.exists() {
            return Err(ConfigurationError::BaseDirMissing {
                url: base_dir.url(),
            });
        }

        let mut configurations = HashMap::new();
        for folder in find_files(base_dir, &ConfigFolderSelector)? {
            match self.load_configuration(&*folder, &bridge) {
                Ok(Some(config)) => {
                    debug!(id = config.identifier(), "registered hadoop configuration");
                    configurations.insert(config.identifier().to_string(), Arc::new(config));
                }
                Ok(None) => {
                    debug!(url = %folder.url(), "no hadoop shim declared, skipping folder");
                }
                Err(e) => {
                    warn!(
                        url = %folder.url(),
                        error = %error_chain(&e),
                        "unable to load hadoop configuration"
                    );
                }
            }
        }

        self.configurations = configurations;
        self.active_resolver = Some(active_resolver);
        self.initialized = true;
        Ok(())
    }

    /// Assemble one configuration folder, or `None` when it declares no
    /// primary shim.
    fn load_configuration(
        &self,
        folder: &dyn VfsFile,
        bridge: &Arc<FileSystemBridge>,
    ) -> LocatorResult<Option<HadoopConfiguration>> {
        let properties = self.read_properties(folder)?;

        if let Some(spec) = properties.get(PROPERTY_LIBRARY_PATH) {
            native::register_native_library_paths(spec);
        }

        let ignored: Vec<String> = properties
            .get(PROPERTY_IGNORE_CLASSES)
            .map(|spec| {
                spec.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let classpath = properties.get(PROPERTY_CLASSPATH).unwrap_or_default();
        let loader = self.create_configuration_loader(folder, classpath, ignored)?;

        let Some(hadoop_shim) = services::locate_hadoop_shim(&loader)? else {
            return Ok(None);
        };
        let sqoop_shim = services::locate_sqoop_shim(&loader)?;
        let pig_shim = services::locate_pig_shim(&loader)?;
        let snappy_shim = services::locate_snappy_shim(&loader)?;

        let id = folder.base_name();
        let name = properties.get(PROPERTY_NAME).unwrap_or(&id).to_string();
        let config = HadoopConfiguration::new(
            id,
            name,
            hadoop_shim,
            sqoop_shim,
            pig_shim,
            snappy_shim,
            Arc::new(loader),
        );

        config
            .hadoop_shim()
            .on_load(&config, bridge)
            .map_err(|source| ConfigurationError::OnLoad {
                url: folder.url(),
                source,
            })?;

        Ok(Some(config))
    }

    fn read_properties(&self, folder: &dyn VfsFile) -> LocatorResult<Properties> {
        match folder.child(CONFIG_PROPERTIES_FILE) {
            Some(file) => {
                Properties::load(&*file).map_err(|source| ConfigurationError::Properties {
                    url: file.url(),
                    source,
                })
            }
            None => Ok(Properties::default()),
        }
    }

    /// Build the loading scope for one configuration folder.
    ///
    /// Search order: classpath entries first, then the folder itself as a
    /// resource root, then every bundle library up to two levels below it.
    fn create_configuration_loader(
        &self,
        folder: &dyn VfsFile,
        classpath: &str,
        ignored: Vec<String>,
    ) -> LocatorResult<ShimLoader> {
        if folder.kind() != FileKind::Folder {
            return Err(crate::vfs::VfsError::NotAFolder { url: folder.url() }.into());
        }

        let mut entries = parse_classpath(folder, classpath);
        entries.push(BundleRoot::Dir(folder.clone_box()));
        for library in find_libraries_in(folder, 2)? {
            entries.push(BundleRoot::Library(library));
        }

        Ok(ShimLoader::new(
            entries,
            Arc::clone(&self.host),
            ignored,
            &*self.library_loader,
        )?)
    }

    fn check_initialized(&self) -> LocatorResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(ConfigurationError::NotInitialized)
        }
    }

    /// All discovered configurations, in no particular order.
    pub fn get_configurations(&self) -> LocatorResult<Vec<Arc<HadoopConfiguration>>> {
        self.check_initialized()?;
        Ok(self.configurations.values().cloned().collect())
    }

    pub fn has_configuration(&self, id: &str) -> LocatorResult<bool> {
        self.check_initialized()?;
        Ok(self.configurations.contains_key(id))
    }

    pub fn get_configuration(&self, id: &str) -> LocatorResult<Arc<HadoopConfiguration>> {
        self.check_initialized()?;
        self.configurations
            .get(id)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownConfiguration { id: id.to_string() })
    }

    /// The configuration named by the active-configuration resolver.
    pub fn get_active_configuration(&self) -> LocatorResult<Arc<HadoopConfiguration>> {
        self.check_initialized()?;
        let resolver = self
            .active_resolver
            .as_ref()
            .ok_or(ConfigurationError::NotInitialized)?;
        self.get_configuration(&resolver.active_configuration_id())
    }
}

/// Render an error and its source chain on a single diagnostic line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoadedLibrary, LoaderError};
    use crate::shim::{HadoopShim, ShimError, ShimRegistry};
    use crate::vfs::LocalFile;
    use tempfile::TempDir;

    struct NullShim;

    impl HadoopShim for NullShim {
        fn on_load(
            &self,
            _config: &HadoopConfiguration,
            _fs: &FileSystemBridge,
        ) -> Result<(), ShimError> {
            Ok(())
        }
    }

    struct NoopLibraryLoader;

    impl BundleLibraryLoader for NoopLibraryLoader {
        fn load(
            &self,
            _file: &dyn VfsFile,
            _registry: &mut ShimRegistry,
        ) -> Result<LoadedLibrary, LoaderError> {
            Ok(LoadedLibrary::unbacked())
        }
    }

    fn write_config_folder(base: &std::path::Path, id: &str, properties: &str, shim_name: &str) {
        let folder = base.join(id);
        let services = folder.join("META-INF/services");
        std::fs::create_dir_all(&services).unwrap();
        std::fs::write(folder.join(CONFIG_PROPERTIES_FILE), properties).unwrap();
        std::fs::write(services.join("hadoop-shim"), format!("{shim_name}\n")).unwrap();
    }

    fn locator_with(shims: &[&str]) -> HadoopConfigurationLocator {
        let mut host = HostScope::new();
        for name in shims {
            host.registry_mut()
                .register_hadoop(*name, || Ok(Box::new(NullShim)));
        }
        HadoopConfigurationLocator::new()
            .with_host_scope(Arc::new(host))
            .with_library_loader(Arc::new(NoopLibraryLoader))
    }

    #[test]
    fn test_queries_before_init_fail() {
        let locator = HadoopConfigurationLocator::new();
        assert!(matches!(
            locator.get_configurations(),
            Err(ConfigurationError::NotInitialized)
        ));
        assert!(matches!(
            locator.has_configuration("cdh5"),
            Err(ConfigurationError::NotInitialized)
        ));
        assert!(matches!(
            locator.get_active_configuration(),
            Err(ConfigurationError::NotInitialized)
        ));
    }

    #[test]
    fn test_missing_base_dir_fails_init() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("no-such-dir");
        let mut locator = HadoopConfigurationLocator::new();
        let err = locator
            .init(
                &LocalFile::new(&missing),
                Box::new(|| "cdh5".to_string()),
                Arc::new(FileSystemBridge::new()),
            )
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::BaseDirMissing { .. }));
        assert!(matches!(
            locator.get_configurations(),
            Err(ConfigurationError::NotInitialized)
        ));
    }

    #[test]
    fn test_folder_without_shim_declaration_is_skipped() {
        let temp = TempDir::new().unwrap();
        write_config_folder(temp.path(), "cdh5", "name=CDH 5\n", "org.example.Cdh5");
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();

        let mut locator = locator_with(&["org.example.Cdh5"]);
        locator
            .init(
                &LocalFile::new(temp.path()),
                Box::new(|| "cdh5".to_string()),
                Arc::new(FileSystemBridge::new()),
            )
            .unwrap();

        assert!(locator.has_configuration("cdh5").unwrap());
        assert!(!locator.has_configuration("docs").unwrap());
        assert_eq!(locator.get_configurations().unwrap().len(), 1);
    }

    #[test]
    fn test_configuration_name_defaults_to_identifier() {
        let temp = TempDir::new().unwrap();
        write_config_folder(temp.path(), "hdp2", "", "org.example.Hdp2");

        let mut locator = locator_with(&["org.example.Hdp2"]);
        locator
            .init(
                &LocalFile::new(temp.path()),
                Box::new(|| "hdp2".to_string()),
                Arc::new(FileSystemBridge::new()),
            )
            .unwrap();

        let config = locator.get_configuration("hdp2").unwrap();
        assert_eq!(config.identifier(), "hdp2");
        assert_eq!(config.name(), "hdp2");
        assert_eq!(config.to_string(), "hdp2");
    }

    #[test]
    fn test_unknown_configuration_lookup_fails() {
        let temp = TempDir::new().unwrap();
        write_config_folder(temp.path(), "cdh5", "name=CDH 5\n", "org.example.Cdh5");

        let mut locator = locator_with(&["org.example.Cdh5"]);
        locator
            .init(
                &LocalFile::new(temp.path()),
                Box::new(|| "cdh5".to_string()),
                Arc::new(FileSystemBridge::new()),
            )
            .unwrap();

        assert!(matches!(
            locator.get_configuration("mapr"),
            Err(ConfigurationError::UnknownConfiguration { .. })
        ));
    }

    #[test]
    fn test_error_chain_carries_source_detail() {
        let err = ConfigurationError::OnLoad {
            url: "file:///base/cdh5".to_string(),
            source: ShimError::OnLoad("native codec unavailable".to_string()),
        };
        let rendered = error_chain(&err);
        assert!(rendered.contains("file:///base/cdh5"));
        assert!(rendered.contains("native codec unavailable"));
    }

    #[test]
    fn test_second_init_replaces_registry() {
        let first = TempDir::new().unwrap();
        write_config_folder(first.path(), "cdh5", "name=CDH 5\n", "org.example.Cdh5");
        let second = TempDir::new().unwrap();
        write_config_folder(second.path(), "hdp2", "name=HDP 2\n", "org.example.Hdp2");

        let mut locator = locator_with(&["org.example.Cdh5", "org.example.Hdp2"]);
        let bridge = Arc::new(FileSystemBridge::new());
        locator
            .init(
                &LocalFile::new(first.path()),
                Box::new(|| "cdh5".to_string()),
                Arc::clone(&bridge),
            )
            .unwrap();
        locator
            .init(
                &LocalFile::new(second.path()),
                Box::new(|| "hdp2".to_string()),
                bridge,
            )
            .unwrap();

        assert!(!locator.has_configuration("cdh5").unwrap());
        assert!(locator.has_configuration("hdp2").unwrap());
        assert_eq!(
            locator.get_active_configuration().unwrap().identifier(),
            "hdp2"
        );
    }
}
