//! Shim contracts and the named-factory registry.
//!
//! A shim is an adapter supplied by a distribution bundle. The primary
//! [`HadoopShim`] is required for a directory to count as a configuration and
//! receives a one-shot [`HadoopShim::on_load`] callback; the ancillary sqoop,
//! pig and snappy shims are optional and carry no locator-mandated lifecycle,
//! so their contracts here are markers that implementations extend with their
//! own surface.
//!
//! Implementations are instantiated through factories registered under an
//! implementation name. Bundle libraries fill a scope-local [`ShimRegistry`]
//! from their registration entry point; the embedding application fills the
//! host scope's registry programmatically.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::HadoopConfiguration;
use crate::vfs::bridge::FileSystemBridge;

/// Errors produced by shim factories and load callbacks.
#[derive(Debug, Error)]
pub enum ShimError {
    /// The factory failed to construct the shim.
    #[error("shim instantiation failed: {0}")]
    Instantiation(String),

    /// The primary shim's load callback failed.
    #[error("shim load callback failed: {0}")]
    OnLoad(String),
}

/// The primary shim contract.
pub trait HadoopShim: Send + Sync {
    /// Called exactly once, after the owning configuration is fully built.
    ///
    /// The shim may resolve further resources lazily through
    /// `config.loader()` and may register virtual-file providers with the
    /// bridge. An error here rejects the whole configuration.
    fn on_load(
        &self,
        config: &HadoopConfiguration,
        fs: &FileSystemBridge,
    ) -> Result<(), ShimError>;
}

/// Optional sqoop integration shim.
pub trait SqoopShim: Send + Sync {}

/// Optional pig integration shim.
pub trait PigShim: Send + Sync {}

/// Optional snappy codec shim.
pub trait SnappyShim: Send + Sync {}

/// The four shim contracts a configuration scope is probed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShimKind {
    Hadoop,
    Sqoop,
    Pig,
    Snappy,
}

impl ShimKind {
    /// Name of the service declaration file under `META-INF/services/`.
    pub fn contract_key(self) -> &'static str {
        match self {
            ShimKind::Hadoop => "hadoop-shim",
            ShimKind::Sqoop => "sqoop-shim",
            ShimKind::Pig => "pig-shim",
            ShimKind::Snappy => "snappy-shim",
        }
    }
}

impl fmt::Display for ShimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.contract_key())
    }
}

pub type HadoopShimCtor = Arc<dyn Fn() -> Result<Box<dyn HadoopShim>, ShimError> + Send + Sync>;
pub type SqoopShimCtor = Arc<dyn Fn() -> Result<Box<dyn SqoopShim>, ShimError> + Send + Sync>;
pub type PigShimCtor = Arc<dyn Fn() -> Result<Box<dyn PigShim>, ShimError> + Send + Sync>;
pub type SnappyShimCtor = Arc<dyn Fn() -> Result<Box<dyn SnappyShim>, ShimError> + Send + Sync>;

/// A registered constructor for one of the four contracts.
#[derive(Clone)]
pub enum ShimFactory {
    Hadoop(HadoopShimCtor),
    Sqoop(SqoopShimCtor),
    Pig(PigShimCtor),
    Snappy(SnappyShimCtor),
}

impl ShimFactory {
    /// The contract this factory satisfies.
    pub fn kind(&self) -> ShimKind {
        match self {
            ShimFactory::Hadoop(_) => ShimKind::Hadoop,
            ShimFactory::Sqoop(_) => ShimKind::Sqoop,
            ShimFactory::Pig(_) => ShimKind::Pig,
            ShimFactory::Snappy(_) => ShimKind::Snappy,
        }
    }
}

impl fmt::Debug for ShimFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShimFactory({})", self.kind())
    }
}

/// Named shim factories visible within one loading scope.
///
/// Within a scope, the first registration of a name wins; later bundles on
/// the search path cannot replace an implementation an earlier bundle
/// already declared.
#[derive(Default)]
pub struct ShimRegistry {
    factories: HashMap<String, ShimFactory>,
}

impl ShimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under an implementation name. First wins.
    pub fn register(&mut self, name: impl Into<String>, factory: ShimFactory) {
        self.factories.entry(name.into()).or_insert(factory);
    }

    pub fn register_hadoop<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn() -> Result<Box<dyn HadoopShim>, ShimError> + Send + Sync + 'static,
    {
        self.register(name, ShimFactory::Hadoop(Arc::new(ctor)));
    }

    pub fn register_sqoop<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn() -> Result<Box<dyn SqoopShim>, ShimError> + Send + Sync + 'static,
    {
        self.register(name, ShimFactory::Sqoop(Arc::new(ctor)));
    }

    pub fn register_pig<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn() -> Result<Box<dyn PigShim>, ShimError> + Send + Sync + 'static,
    {
        self.register(name, ShimFactory::Pig(Arc::new(ctor)));
    }

    pub fn register_snappy<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn() -> Result<Box<dyn SnappyShim>, ShimError> + Send + Sync + 'static,
    {
        self.register(name, ShimFactory::Snappy(Arc::new(ctor)));
    }

    /// Look up a factory by implementation name.
    pub fn get(&self, name: &str) -> Option<&ShimFactory> {
        self.factories.get(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ShimRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ShimRegistry").field("names", &names).finish()
    }
}
