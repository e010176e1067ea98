use thiserror::Error;

use crate::catalog::CatalogError;
use crate::document::DocumentError;
use crate::package::PackageError;
use crate::transform::TransformError;

/// Crate-level error: any failure surfaced by the catalog builder, the
/// style transformer or the packager.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Package(#[from] PackageError),
}

pub type Result<T> = std::result::Result<T, Error>;
