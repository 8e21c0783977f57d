//! Service-declaration lookup within a configuration scope.
//!
//! A bundle advertises the implementation it provides for a contract in a
//! text file named after the contract key under `META-INF/services/`, one
//! implementation name per line. The first non-comment declaration visible
//! through the scope's resource search wins, which lets a configuration's
//! own bundles override anything the host publishes for non-ignored names.

use tracing::debug;

use super::{LoaderError, ShimLoader};
use crate::shim::{
    HadoopShim, PigShim, ShimFactory, ShimKind, SnappyShim, SqoopShim,
};

/// Directory resources holding service declarations.
pub const SERVICES_DIR: &str = "META-INF/services";

/// Parse a declaration file: one name per line, `#` starts a comment, blank
/// lines are skipped.
pub fn parse_declarations(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter_map(|line| {
            let line = match line.find('#') {
                Some(idx) => &line[..idx],
                None => line,
            };
            let line = line.trim();
            (!line.is_empty()).then(|| line.to_string())
        })
        .collect()
}

/// First implementation name declared for a contract, or `None` when no
/// declaration file is visible in the scope.
pub fn first_declared(loader: &ShimLoader, kind: ShimKind) -> Result<Option<String>, LoaderError> {
    let resource = format!("{SERVICES_DIR}/{}", kind.contract_key());
    let bytes = match loader.read_resource(&resource) {
        Ok(bytes) => bytes,
        Err(LoaderError::ResourceNotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(parse_declarations(&bytes).into_iter().next())
}

/// Locate and instantiate the declared primary shim, if any.
pub fn locate_hadoop_shim(loader: &ShimLoader) -> Result<Option<Box<dyn HadoopShim>>, LoaderError> {
    let Some(name) = first_declared(loader, ShimKind::Hadoop)? else {
        return Ok(None);
    };
    debug!(name, "instantiating hadoop shim");
    match loader.resolve_factory(&name)? {
        ShimFactory::Hadoop(ctor) => ctor()
            .map(Some)
            .map_err(|source| LoaderError::Instantiation { name, source }),
        _ => Err(LoaderError::ContractMismatch {
            name,
            expected: ShimKind::Hadoop,
        }),
    }
}

/// Locate and instantiate the declared sqoop shim, if any.
pub fn locate_sqoop_shim(loader: &ShimLoader) -> Result<Option<Box<dyn SqoopShim>>, LoaderError> {
    let Some(name) = first_declared(loader, ShimKind::Sqoop)? else {
        return Ok(None);
    };
    match loader.resolve_factory(&name)? {
        ShimFactory::Sqoop(ctor) => ctor()
            .map(Some)
            .map_err(|source| LoaderError::Instantiation { name, source }),
        _ => Err(LoaderError::ContractMismatch {
            name,
            expected: ShimKind::Sqoop,
        }),
    }
}

/// Locate and instantiate the declared pig shim, if any.
pub fn locate_pig_shim(loader: &ShimLoader) -> Result<Option<Box<dyn PigShim>>, LoaderError> {
    let Some(name) = first_declared(loader, ShimKind::Pig)? else {
        return Ok(None);
    };
    match loader.resolve_factory(&name)? {
        ShimFactory::Pig(ctor) => ctor()
            .map(Some)
            .map_err(|source| LoaderError::Instantiation { name, source }),
        _ => Err(LoaderError::ContractMismatch {
            name,
            expected: ShimKind::Pig,
        }),
    }
}

/// Locate and instantiate the declared snappy shim, if any.
pub fn locate_snappy_shim(loader: &ShimLoader) -> Result<Option<Box<dyn SnappyShim>>, LoaderError> {
    let Some(name) = first_declared(loader, ShimKind::Snappy)? else {
        return Ok(None);
    };
    match loader.resolve_factory(&name)? {
        ShimFactory::Snappy(ctor) => ctor()
            .map(Some)
            .map_err(|source| LoaderError::Instantiation { name, source }),
        _ => Err(LoaderError::ContractMismatch {
            name,
            expected: ShimKind::Snappy,
        }),
    }
}
