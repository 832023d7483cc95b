//! Read-only SQL over Unity Catalog tables, backed by DataFusion.

pub mod catalog_provider;
pub mod engine;
pub mod error;
pub mod schema_provider;

pub use catalog_provider::UcCatalogProvider;
pub use engine::SqlEngine;
pub use error::SqlError;
pub use schema_provider::UcSchemaProvider;
