use std::{any::Any, fmt::Debug, sync::Arc};

use datafusion::{
    catalog::{CatalogProvider, SchemaProvider},
    common::not_impl_err,
    prelude::SessionContext,
};
use uchelper_models::SchemaName;
use uchelper_rest::UnityCatalogApi;

use crate::{error::SqlError, schema_provider::UcSchemaProvider};

/// Exposes one Unity Catalog catalog, with all of its schemas, to DataFusion.
pub struct UcCatalogProvider {
    api: UnityCatalogApi,
    catalog: String,
    loader_ctx: Arc<SessionContext>,
    schemas_map: Arc<parking_lot::Mutex<indexmap::IndexMap<String, Arc<UcSchemaProvider>>>>,
}

impl Debug for UcCatalogProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UcCatalogProvider")
            .field("catalog", &self.catalog)
            .field("schemas_map", &self.schemas_map)
            .finish()
    }
}

impl UcCatalogProvider {
    /// Fails when the catalog does not exist in the service.
    pub async fn try_new(
        api: UnityCatalogApi,
        catalog: &str,
        loader_ctx: Arc<SessionContext>,
    ) -> Result<Self, SqlError> {
        api.get_catalog(catalog).await?;
        let provider = Self {
            api,
            catalog: catalog.to_string(),
            loader_ctx,
            schemas_map: Arc::new(parking_lot::Mutex::new(indexmap::IndexMap::new())),
        };
        provider.refresh().await?;
        Ok(provider)
    }

    /// Re-lists the schemas of the catalog and the tables of every schema.
    pub async fn refresh(&self) -> Result<(), SqlError> {
        let schemas = self.api.list_schemas(&self.catalog).await?;

        let mut refreshed = indexmap::IndexMap::new();
        for schema in schemas {
            let existing = self.schemas_map.lock().get(&schema.name).cloned();
            let provider = match existing {
                Some(provider) => provider,
                None => Arc::new(UcSchemaProvider::new(
                    self.api.clone(),
                    SchemaName::new(&self.catalog, &schema.name)?,
                    self.loader_ctx.clone(),
                )),
            };
            provider.refresh().await?;
            refreshed.insert(schema.name, provider);
        }

        *self.schemas_map.lock() = refreshed;
        Ok(())
    }
}

impl CatalogProvider for UcCatalogProvider {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema_names(&self) -> Vec<String> {
        self.schemas_map.lock().keys().cloned().collect()
    }

    fn schema(&self, name: &str) -> Option<Arc<dyn SchemaProvider>> {
        self.schemas_map
            .lock()
            .get(name)
            .map(|s| s.clone() as Arc<dyn SchemaProvider>)
    }

    #[allow(unused_variables)]
    fn register_schema(
        &self,
        name: &str,
        schema: Arc<dyn SchemaProvider>,
    ) -> datafusion::error::Result<Option<Arc<dyn SchemaProvider>>> {
        not_impl_err!("Schemas are read only through SQL, use the Unity Catalog client to create them.")
    }
}
