use arrow::array::RecordBatch;
use datafusion::dataframe::DataFrame;
use uchelper_frames::{
    location::{to_location, LOCAL_SCHEME},
    DeltaTable, MergeBuilder, MergeOptions, WriteOptions,
};
use uchelper_models::{
    Catalog, FileType, FullName, Schema, SchemaEvolution, SchemaName, Table, TableType, WriteMode,
};
use uchelper_rest::{TableUpdate, UnityCatalogApi};
use uchelper_sql::SqlEngine;

use crate::error::{Error, Result};

const DELTA_PROPERTY_PREFIX: &str = "delta.";

/// How [`UcClient::create_as_table`] stores a new table.
#[derive(Debug, Clone)]
pub struct CreateTableOptions {
    pub file_type: FileType,
    pub table_type: TableType,
    /// `file://<absolute_path>`. Required for EXTERNAL tables.
    pub location: Option<String>,
    pub partition_cols: Vec<String>,
}

impl Default for CreateTableOptions {
    fn default() -> Self {
        Self {
            file_type: FileType::Delta,
            table_type: TableType::External,
            location: None,
            partition_cols: Vec::new(),
        }
    }
}

impl CreateTableOptions {
    pub fn new(file_type: FileType, location: impl Into<String>) -> Self {
        Self {
            file_type,
            location: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn with_table_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    pub fn with_partition_cols(mut self, partition_cols: Vec<String>) -> Self {
        self.partition_cols = partition_cols;
        self
    }
}

/// Holds the connections to Unity Catalog (REST and SQL) and exposes every operation on it.
pub struct UcClient {
    api: UnityCatalogApi,
    sql_engine: SqlEngine,
}

impl UcClient {
    /// Connects to the Unity Catalog at `uc_url`.
    ///
    /// The configured default catalog is attached for SQL. When that fails the
    /// client stays usable for everything but [`UcClient::sql`].
    pub async fn new(uc_url: &str) -> Result<Self> {
        let api = UnityCatalogApi::new(uc_url)?;
        Self::with_api(api, &uchelper_config::CONFIG.default_catalog).await
    }

    pub async fn with_api(api: UnityCatalogApi, default_catalog: &str) -> Result<Self> {
        let sql_engine = SqlEngine::connect(api.clone(), default_catalog).await?;
        Ok(Self { api, sql_engine })
    }

    pub async fn from_env() -> Result<Self> {
        Self::new(&uchelper_config::CONFIG.uc_url).await
    }

    pub fn api(&self) -> &UnityCatalogApi {
        &self.api
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.api.health_check().await?)
    }

    pub async fn create_catalog(&self, catalog: &Catalog) -> Result<Catalog> {
        Ok(self.api.create_catalog(catalog).await?)
    }

    pub async fn delete_catalog(&self, name: &str, force: bool) -> Result<bool> {
        Ok(self.api.delete_catalog(name, force).await?)
    }

    pub async fn list_catalogs(&self) -> Result<Vec<Catalog>> {
        Ok(self.api.list_catalogs().await?)
    }

    pub async fn get_catalog(&self, name: &str) -> Result<Catalog> {
        Ok(self.api.get_catalog(name).await?)
    }

    pub async fn update_catalog(&self, name: &str, catalog: &Catalog) -> Result<Catalog> {
        Ok(self.api.update_catalog(name, catalog).await?)
    }

    pub async fn create_schema(&self, schema: &Schema) -> Result<Schema> {
        Ok(self.api.create_schema(schema).await?)
    }

    pub async fn delete_schema(&self, catalog: &str, schema: &str, force: bool) -> Result<bool> {
        Ok(self.api.delete_schema(catalog, schema, force).await?)
    }

    pub async fn get_schema(&self, catalog: &str, schema: &str) -> Result<Schema> {
        Ok(self.api.get_schema(catalog, schema).await?)
    }

    pub async fn list_schemas(&self, catalog: &str) -> Result<Vec<Schema>> {
        Ok(self.api.list_schemas(catalog).await?)
    }

    pub async fn update_schema(
        &self,
        catalog: &str,
        schema_name: &str,
        new_schema: &Schema,
    ) -> Result<Schema> {
        Ok(self.api.update_schema(catalog, schema_name, new_schema).await?)
    }

    pub async fn create_table(&self, table: &Table) -> Result<Table> {
        Ok(self.api.create_table(table).await?)
    }

    pub async fn delete_table(&self, name: &FullName) -> Result<()> {
        Ok(self.api.delete_table(name).await?)
    }

    pub async fn get_table(&self, name: &FullName) -> Result<Table> {
        Ok(self.api.get_table(name).await?)
    }

    pub async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<Table>> {
        Ok(self.api.list_tables(&SchemaName::new(catalog, schema)?).await?)
    }

    pub async fn overwrite_table(&self, table: &Table) -> Result<Table> {
        Ok(self.api.overwrite_table(table).await?)
    }

    pub async fn update_table(&self, name: &FullName, update: &TableUpdate) -> Result<Table> {
        Ok(self.api.update_table(name, update).await?)
    }

    pub async fn set_table_default_merge_columns(
        &self,
        name: &FullName,
        merge_columns: &[String],
    ) -> Result<Table> {
        Ok(self
            .api
            .set_table_default_merge_columns(name, merge_columns)
            .await?)
    }

    pub async fn read_table(&self, name: &FullName) -> Result<RecordBatch> {
        let table = self.api.get_table(name).await?;
        Ok(uchelper_frames::read_table(&table).await?)
    }

    /// Lazily scans the table into a frame bound to the SQL session.
    pub async fn scan_table(&self, name: &FullName) -> Result<DataFrame> {
        let table = self.api.get_table(name).await?;
        let ctx = self.sql_engine.session_context();
        Ok(uchelper_frames::scan_table(&ctx, &table).await?)
    }

    /// Opens the Delta table behind `name`. Fails for tables of any other format.
    pub async fn get_delta_table(&self, name: &FullName) -> Result<DeltaTable> {
        let table = self.api.get_table(name).await?;
        Ok(uchelper_frames::open_delta_table(&table).await?)
    }

    /// Copies the `delta.*` properties of the Delta log into Unity Catalog.
    ///
    /// Stored `delta.*` properties are replaced, other properties are kept. The
    /// sync only goes from the Delta table to Unity Catalog.
    pub async fn sync_delta_properties(&self, name: &FullName) -> Result<Table> {
        let mut table = self.api.get_table(name).await?;
        let delta_properties = uchelper_frames::delta_properties(&table).await?;

        table
            .properties
            .retain(|key, _| !key.starts_with(DELTA_PROPERTY_PREFIX));
        table.properties.extend(delta_properties);
        Ok(self.api.overwrite_table(&table).await?)
    }

    /// Writes `batch` to the table `name`, updating its stored columns when the
    /// write changed the schema.
    pub async fn write_table(
        &self,
        batch: RecordBatch,
        name: &FullName,
        mode: WriteMode,
        evolution: SchemaEvolution,
        options: &WriteOptions,
    ) -> Result<()> {
        let mut table = self.api.get_table(name).await?;
        let new_columns =
            uchelper_frames::write_table(&table, batch, mode, evolution, options).await?;

        if let Some(columns) = new_columns {
            tracing::debug!("Updating the stored schema of {}", name);
            table.columns = columns;
            self.api
                .overwrite_table(&table)
                .await
                .map_err(|source| Error::SchemaUpdateError {
                    table: name.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Prepares a merge of `batch` into the DELTA table `name`. Schemas must match exactly.
    pub async fn merge_table(
        &self,
        batch: RecordBatch,
        name: &FullName,
        options: &MergeOptions,
    ) -> Result<MergeBuilder> {
        let table = self.api.get_table(name).await?;
        Ok(uchelper_frames::merge_table(&table, batch, options).await?)
    }

    /// Creates the table `name` with the schema of `batch` and writes `batch` to it.
    pub async fn create_as_table(
        &self,
        batch: RecordBatch,
        name: &FullName,
        options: &CreateTableOptions,
    ) -> Result<Table> {
        if options.table_type == TableType::Managed {
            return Err(Error::UnsupportedOperation(
                "MANAGED tables are not yet supported.".to_string(),
            ));
        }
        let location = options.location.as_deref().ok_or_else(|| {
            Error::UnsupportedOperation(
                "To create an EXTERNAL table, you must specify a location to store it in."
                    .to_string(),
            )
        })?;
        if !location.starts_with(LOCAL_SCHEME) {
            return Err(Error::UnsupportedOperation(
                "Only local storage is supported. Hint: location must be of the form file://<absolute_path>, e.g. file:///home/me/ex-delta-table".to_string(),
            ));
        }

        let columns = uchelper_frames::assign_partitions(
            uchelper_frames::schema_to_columns(&batch.schema())?,
            options.file_type,
            &options.partition_cols,
        )?;
        let table = Table::new(name, options.table_type, options.file_type, columns)
            .with_storage_location(location);

        let created = self.api.create_table(&table).await?;
        uchelper_frames::write_table(
            &created,
            batch,
            WriteMode::Overwrite,
            SchemaEvolution::Strict,
            &WriteOptions::default(),
        )
        .await?;
        Ok(created)
    }

    /// Registers existing data at `path` as the EXTERNAL table `name`.
    ///
    /// `path` is absolute or `file://<absolute_path>`. The columns are derived
    /// by reading the data.
    pub async fn register_as_table(
        &self,
        path: &str,
        name: &FullName,
        file_type: FileType,
        partition_cols: &[String],
    ) -> Result<Table> {
        let location = to_location(path)?;
        let mut table = Table::new(name, TableType::External, file_type, vec![])
            .with_storage_location(location);
        table.columns = uchelper_frames::infer_columns(&table, partition_cols).await?;
        Ok(self.api.create_table(&table).await?)
    }

    /// Runs a read-only SQL query. Tables are addressed as `catalog.schema.table`.
    pub async fn sql(&self, query: &str) -> Result<DataFrame> {
        Ok(self.sql_engine.sql(query).await?)
    }

    /// Makes catalog `name` available to [`UcClient::sql`] as `alias`.
    pub async fn attach_catalog(&self, name: &str, alias: &str) -> Result<()> {
        Ok(self.sql_engine.attach_catalog(name, alias).await?)
    }
}
