use std::sync::Arc;

use datafusion::{
    dataframe::DataFrame,
    execution::{
        disk_manager::DiskManagerConfig, memory_pool::FairSpillPool, runtime_env::RuntimeEnvBuilder,
    },
    prelude::{SQLOptions, SessionConfig, SessionContext},
};
use uchelper_rest::UnityCatalogApi;

use crate::{catalog_provider::UcCatalogProvider, error::SqlError};

/// Read-only SQL over the tables registered in Unity Catalog.
pub struct SqlEngine {
    api: UnityCatalogApi,
    session_ctx: Arc<SessionContext>,
    // Builds table providers. Must not be `session_ctx`, which holds the providers.
    loader_ctx: Arc<SessionContext>,
    catalogs: parking_lot::Mutex<indexmap::IndexMap<String, Arc<UcCatalogProvider>>>,
    setup_error: parking_lot::Mutex<Option<String>>,
}

impl SqlEngine {
    pub fn new(api: UnityCatalogApi) -> Result<Self, SqlError> {
        let memory_pool = Arc::new(FairSpillPool::new(
            uchelper_config::CONFIG.sql_memory_size * 1024 * 1024,
        ));

        Ok(Self {
            api,
            session_ctx: Self::init_ctx(memory_pool)?,
            loader_ctx: Arc::new(SessionContext::new()),
            catalogs: parking_lot::Mutex::new(indexmap::IndexMap::new()),
            setup_error: parking_lot::Mutex::new(None),
        })
    }

    /// Creates an engine with `default_catalog` attached under its own name.
    ///
    /// A catalog that cannot be attached is logged and leaves the engine unusable
    /// until a later [`SqlEngine::attach_catalog`] succeeds.
    pub async fn connect(api: UnityCatalogApi, default_catalog: &str) -> Result<Self, SqlError> {
        let engine = Self::new(api)?;
        if let Err(e) = engine.attach_catalog(default_catalog, default_catalog).await {
            tracing::warn!(
                "Failed to create a SQL connection to Unity Catalog catalog {}: {}",
                default_catalog,
                e
            );
            *engine.setup_error.lock() = Some(e.to_string());
        }
        Ok(engine)
    }

    fn init_ctx(mem_pool: Arc<FairSpillPool>) -> Result<Arc<SessionContext>, SqlError> {
        let mut config = SessionConfig::new()
            .with_coalesce_batches(true)
            .with_information_schema(true);

        config.options_mut().sql_parser.enable_ident_normalization = false;

        let runtime_env = RuntimeEnvBuilder::new()
            .with_disk_manager(DiskManagerConfig::NewOs)
            .with_memory_pool(mem_pool)
            .build_arc()?;

        Ok(Arc::new(SessionContext::new_with_config_rt(
            config,
            runtime_env,
        )))
    }

    pub fn session_context(&self) -> Arc<SessionContext> {
        self.session_ctx.clone()
    }

    /// Makes catalog `name` queryable as `alias`.
    pub async fn attach_catalog(&self, name: &str, alias: &str) -> Result<(), SqlError> {
        if self.catalogs.lock().contains_key(alias) {
            return Err(SqlError::AlreadyAttached(alias.to_string()));
        }

        let provider = Arc::new(
            UcCatalogProvider::try_new(self.api.clone(), name, self.loader_ctx.clone()).await?,
        );
        {
            let mut catalogs = self.catalogs.lock();
            // Another attach may have taken the alias while the catalog was loading.
            if catalogs.contains_key(alias) {
                return Err(SqlError::AlreadyAttached(alias.to_string()));
            }
            self.session_ctx.register_catalog(alias, provider.clone());
            catalogs.insert(alias.to_string(), provider);
        }
        *self.setup_error.lock() = None;

        tracing::debug!("Attached catalog {} as {}", name, alias);
        Ok(())
    }

    pub fn attached_catalogs(&self) -> Vec<String> {
        self.catalogs.lock().keys().cloned().collect()
    }

    /// Runs a read-only query. DDL, DML and other statements are rejected.
    pub async fn sql(&self, query: &str) -> Result<DataFrame, SqlError> {
        if let Some(error) = self.setup_error.lock().clone() {
            return Err(SqlError::ConnectionSetup(error));
        }

        let catalogs: Vec<Arc<UcCatalogProvider>> =
            self.catalogs.lock().values().cloned().collect();
        for catalog in catalogs {
            catalog.refresh().await?;
        }

        let sql_options = SQLOptions::new()
            .with_allow_ddl(false)
            .with_allow_dml(false)
            .with_allow_statements(false);
        Ok(self.session_ctx.sql_with_options(query, sql_options).await?)
    }
}
