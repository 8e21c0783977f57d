//! Pluggable Hadoop distribution support.
//!
//! Hadoop distributions differ enough that applications integrating with
//! them ship one adapter ("shim") bundle per supported distribution. This
//! crate discovers those bundles on disk, gives each its own isolating
//! loading scope so bundled infrastructure never collides across
//! distributions, and exposes the results as a queryable registry:
//!
//! ```text
//! hadoop-configurations/
//!   cdh5/
//!     config.properties
//!     META-INF/services/hadoop-shim
//!     lib/libcdh5_shim.so
//!   hdp2/
//!     ...
//! ```
//!
//! [`HadoopConfigurationLocator::init`] walks the base directory once;
//! afterwards configurations are addressed by folder name, and the active
//! one is selected through an [`ActiveConfigurationResolver`] consulted on
//! every lookup.

pub mod config;
pub mod error;
pub mod loader;
pub mod locator;
pub mod properties;
pub mod shim;
pub mod vfs;

pub use config::HadoopConfiguration;
pub use error::{ConfigurationError, LocatorResult};
pub use locator::{ActiveConfigurationResolver, HadoopConfigurationLocator};
