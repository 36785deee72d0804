// Material/practice catalog and blend resolution.
//
// Catalogs are immutable, injectable data: built once (from the built-in
// defaults or a TOML document) and passed by reference into the
// calculators. Nothing in here is a process-global.

pub mod blend;
pub mod library;
pub mod variant;

pub use blend::{balance, Blend, BlendEntry, Selection};
pub use library::{CatalogError, VariantLibrary};
pub use variant::{MaterialCategory, Variant, VariantCategory, VariantId};
