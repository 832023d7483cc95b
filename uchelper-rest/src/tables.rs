use std::collections::HashMap;

use uchelper_models::{Column, FileType, FullName, SchemaName, Table, TableType};

use crate::{client::UnityCatalogApi, error::RestError, response};

const TABLES_ENDPOINT: &str = "/tables";

#[derive(serde::Serialize)]
struct CreateTable<'a> {
    name: &'a str,
    catalog_name: &'a str,
    schema_name: &'a str,
    table_type: TableType,
    data_source_format: FileType,
    columns: &'a [Column],
    storage_location: Option<&'a str>,
    comment: Option<&'a str>,
    properties: HashMap<String, String>,
}

impl<'a> From<&'a Table> for CreateTable<'a> {
    fn from(table: &'a Table) -> Self {
        CreateTable {
            name: &table.name,
            catalog_name: &table.catalog_name,
            schema_name: &table.schema_name,
            table_type: table.table_type,
            data_source_format: table.file_type,
            columns: &table.columns,
            storage_location: table.storage_location.as_deref(),
            comment: table.comment.as_deref(),
            properties: table.service_properties(),
        }
    }
}

/// Changes applied by [`UnityCatalogApi::update_table`]. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TableUpdate {
    pub comment: Option<String>,
    pub properties: Option<HashMap<String, String>>,
}

impl TableUpdate {
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = Some(properties);
        self
    }
}

impl UnityCatalogApi {
    /// Creates a table. `storage_location` is required by the service for EXTERNAL tables.
    pub async fn create_table(&self, table: &Table) -> Result<Table, RestError> {
        let full_name = table.full_name()?;
        tracing::debug!("Creating table {} ({})", full_name, table.file_type);

        let response = self
            .client()
            .post(self.endpoint(TABLES_ENDPOINT))
            .json(&CreateTable::from(table))
            .send()
            .await?;
        response::decode(response).await
    }

    pub async fn delete_table(&self, name: &FullName) -> Result<(), RestError> {
        tracing::debug!("Deleting table {}", name);
        let response = self
            .client()
            .delete(self.resource_url(TABLES_ENDPOINT, &name.to_string())?)
            .send()
            .await?;
        response::check(response).await?;
        Ok(())
    }

    pub async fn get_table(&self, name: &FullName) -> Result<Table, RestError> {
        let response = self
            .client()
            .get(self.resource_url(TABLES_ENDPOINT, &name.to_string())?)
            .send()
            .await?;
        response::decode(response).await
    }

    pub async fn list_tables(&self, schema: &SchemaName) -> Result<Vec<Table>, RestError> {
        self.list_paged(
            TABLES_ENDPOINT,
            &[
                ("catalog_name", schema.catalog.as_str()),
                ("schema_name", schema.schema.as_str()),
            ],
            "tables",
        )
        .await
    }

    /// Replaces the stored definition of an existing table with `table`.
    ///
    /// The service has no table update endpoint, so this deletes and recreates the
    /// table. If recreating fails the previous definition is restored and the
    /// error of the recreate is returned.
    pub async fn overwrite_table(&self, table: &Table) -> Result<Table, RestError> {
        let full_name = table.full_name()?;
        let existing = self.get_table(&full_name).await?;

        self.delete_table(&full_name).await?;
        match self.create_table(table).await {
            Ok(created) => Ok(created),
            Err(e) => {
                tracing::error!("Failed to recreate table {}: {}", full_name, e);
                if let Err(restore_err) = self.create_table(&existing).await {
                    tracing::error!(
                        "Failed to restore previous definition of {}: {}",
                        full_name,
                        restore_err
                    );
                }
                Err(e)
            }
        }
    }

    /// Updates the comment and/or properties of a table.
    pub async fn update_table(
        &self,
        name: &FullName,
        update: &TableUpdate,
    ) -> Result<Table, RestError> {
        let mut table = self.get_table(name).await?;
        if let Some(comment) = &update.comment {
            table.comment = Some(comment.clone());
        }
        if let Some(properties) = &update.properties {
            table.properties = properties.clone();
        }
        self.overwrite_table(&table).await
    }

    /// Sets the columns used as merge condition when none is given. Empty clears them.
    pub async fn set_table_default_merge_columns(
        &self,
        name: &FullName,
        merge_columns: &[String],
    ) -> Result<Table, RestError> {
        let mut table = self.get_table(name).await?;
        if let Some(missing) = merge_columns.iter().find(|c| table.column(c).is_none()) {
            return Err(RestError::InvalidArgument(format!(
                "Column {missing} does not exist in table {name}"
            )));
        }
        table.default_merge_columns = merge_columns.to_vec();
        self.overwrite_table(&table).await
    }
}
