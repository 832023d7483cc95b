//! Client for the Unity Catalog REST API.

pub mod catalogs;
pub mod client;
pub mod error;
pub mod schemas;
pub mod tables;

mod pagination;
mod response;

pub use client::UnityCatalogApi;
pub use error::RestError;
pub use tables::TableUpdate;
