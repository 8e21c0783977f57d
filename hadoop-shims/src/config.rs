//! A fully-assembled Hadoop configuration.

use std::fmt;
use std::sync::Arc;

use crate::loader::ShimLoader;
use crate::shim::{HadoopShim, PigShim, SnappyShim, SqoopShim};

/// One loaded distribution: its shims plus the loading scope they came from.
///
/// The primary shim is always present; a directory without one never becomes
/// a configuration. Ancillary shims depend on what the bundle declared.
pub struct HadoopConfiguration {
    id: String,
    name: String,
    hadoop_shim: Box<dyn HadoopShim>,
    sqoop_shim: Option<Box<dyn SqoopShim>>,
    pig_shim: Option<Box<dyn PigShim>>,
    snappy_shim: Option<Box<dyn SnappyShim>>,
    loader: Arc<ShimLoader>,
}

impl HadoopConfiguration {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        hadoop_shim: Box<dyn HadoopShim>,
        sqoop_shim: Option<Box<dyn SqoopShim>>,
        pig_shim: Option<Box<dyn PigShim>>,
        snappy_shim: Option<Box<dyn SnappyShim>>,
        loader: Arc<ShimLoader>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hadoop_shim,
            sqoop_shim,
            pig_shim,
            snappy_shim,
            loader,
        }
    }

    /// Stable identifier, the configuration directory's base name.
    pub fn identifier(&self) -> &str {
        &self.id
    }

    /// Human-readable name from `config.properties`, or the identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hadoop_shim(&self) -> &dyn HadoopShim {
        &*self.hadoop_shim
    }

    pub fn sqoop_shim(&self) -> Option<&dyn SqoopShim> {
        self.sqoop_shim.as_deref()
    }

    pub fn pig_shim(&self) -> Option<&dyn PigShim> {
        self.pig_shim.as_deref()
    }

    pub fn snappy_shim(&self) -> Option<&dyn SnappyShim> {
        self.snappy_shim.as_deref()
    }

    /// The scope this configuration's shims and resources resolve through.
    pub fn loader(&self) -> &Arc<ShimLoader> {
        &self.loader
    }
}

impl fmt::Display for HadoopConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for HadoopConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HadoopConfiguration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("has_sqoop", &self.sqoop_shim.is_some())
            .field("has_pig", &self.pig_shim.is_some())
            .field("has_snappy", &self.snappy_shim.is_some())
            .finish()
    }
}
