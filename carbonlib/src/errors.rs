use thiserror::Error;

use crate::catalog::CatalogError;
use crate::units::UnitError;

/// Main error type for the carbonlib engine.
///
/// Calculation paths degrade to conservative numeric defaults rather than
/// failing; this type covers the fallible seams around them: strict-mode
/// unit conversion, catalog and configuration parsing, serialization.
#[derive(Error, Debug)]
pub enum CarbonError {
    #[error("unit conversion error: {0}")]
    Unit(#[from] UnitError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Type alias for Result with CarbonError
pub type CarbonResult<T> = Result<T, CarbonError>;

impl From<String> for CarbonError {
    fn from(err: String) -> Self {
        CarbonError::Other(err)
    }
}

impl From<&str> for CarbonError {
    fn from(err: &str) -> Self {
        CarbonError::Other(err.to_string())
    }
}
