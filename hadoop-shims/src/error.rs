//! Locator-level error types.

use thiserror::Error;

use crate::loader::LoaderError;
use crate::shim::ShimError;
use crate::vfs::VfsError;

pub type LocatorResult<T> = Result<T, ConfigurationError>;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A query was made before `init` completed.
    #[error("hadoop configuration locator has not been initialized")]
    NotInitialized,

    /// The configured base directory does not exist.
    #[error("hadoop configurations directory does not exist: {url}")]
    BaseDirMissing { url: String },

    /// No configuration is registered under the requested identifier.
    #[error("unknown hadoop configuration: {id}")]
    UnknownConfiguration { id: String },

    /// `config.properties` exists but could not be read.
    #[error("unable to read configuration properties at {url}")]
    Properties {
        url: String,
        #[source]
        source: VfsError,
    },

    /// The primary shim's load callback failed for a configuration.
    #[error("hadoop configuration at {url} failed its load callback")]
    OnLoad {
        url: String,
        #[source]
        source: ShimError,
    },

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Vfs(#[from] VfsError),
}
