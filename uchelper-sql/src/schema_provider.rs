use std::{any::Any, fmt::Debug, sync::Arc};

use datafusion::{
    catalog::{SchemaProvider, TableProvider},
    common::not_impl_err,
    error::DataFusionError,
    prelude::SessionContext,
};
use uchelper_models::{FileType, FullName, SchemaName};
use uchelper_rest::UnityCatalogApi;

use crate::error::SqlError;

/// Exposes the tables of one Unity Catalog schema to DataFusion.
///
/// Table names are cached and refreshed by [`UcSchemaProvider::refresh`]. Table
/// definitions are fetched from the service on every lookup.
pub struct UcSchemaProvider {
    api: UnityCatalogApi,
    schema: SchemaName,
    loader_ctx: Arc<SessionContext>,
    tables_map: Arc<parking_lot::Mutex<indexmap::IndexMap<String, FileType>>>,
}

impl Debug for UcSchemaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UcSchemaProvider")
            .field("schema", &self.schema.to_string())
            .field("tables_map", &self.tables_map)
            .finish()
    }
}

impl UcSchemaProvider {
    pub fn new(api: UnityCatalogApi, schema: SchemaName, loader_ctx: Arc<SessionContext>) -> Self {
        Self {
            api,
            schema,
            loader_ctx,
            tables_map: Arc::new(parking_lot::Mutex::new(indexmap::IndexMap::new())),
        }
    }

    pub async fn refresh(&self) -> Result<(), SqlError> {
        let tables = self.api.list_tables(&self.schema).await?;
        let tables_map = tables
            .into_iter()
            .map(|t| (t.name, t.file_type))
            .collect();
        tracing::debug!("Refreshed tables of schema {}", self.schema);
        *self.tables_map.lock() = tables_map;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SchemaProvider for UcSchemaProvider {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn table_names(&self) -> Vec<String> {
        self.tables_map.lock().keys().cloned().collect()
    }

    async fn table(&self, name: &str) -> Result<Option<Arc<dyn TableProvider>>, DataFusionError> {
        if !self.table_exist(name) {
            return Ok(None);
        }

        let full_name = FullName::new(&self.schema.catalog, &self.schema.schema, name)
            .map_err(|e| DataFusionError::Plan(e.to_string()))?;
        let table = self.api.get_table(&full_name).await.map_err(|e| {
            DataFusionError::Execution(format!("Failed to get table {}: {}", full_name, e))
        })?;
        let provider = uchelper_frames::table_provider(&self.loader_ctx, &table)
            .await
            .map_err(|e| {
                DataFusionError::Execution(format!(
                    "Failed to get table provider for table {}: {}",
                    full_name, e
                ))
            })?;
        Ok(Some(provider))
    }

    #[allow(unused_variables)]
    fn register_table(
        &self,
        name: String,
        table: Arc<dyn TableProvider>,
    ) -> datafusion::error::Result<Option<Arc<dyn TableProvider>>> {
        not_impl_err!("Tables are read only through SQL, use the Unity Catalog client to create them.")
    }

    #[allow(unused_variables)]
    fn deregister_table(
        &self,
        name: &str,
    ) -> datafusion::error::Result<Option<Arc<dyn TableProvider>>> {
        not_impl_err!("Tables are read only through SQL, use the Unity Catalog client to delete them.")
    }

    fn table_exist(&self, name: &str) -> bool {
        self.tables_map.lock().contains_key(name)
    }
}
