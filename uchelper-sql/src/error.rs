use datafusion::error::DataFusionError;
use uchelper_rest::RestError;

#[derive(Debug, thiserror::Error)]
pub enum SqlError {
    #[error("Failed to set up the SQL connection to Unity Catalog: {0}")]
    ConnectionSetup(String),
    #[error("A catalog is already attached as {0}")]
    AlreadyAttached(String),
    #[error("Unity Catalog error: {0}")]
    RestError(#[from] RestError),
    #[error(transparent)]
    ModelError(#[from] uchelper_models::ModelError),
    #[error("DataFusion error: {0}")]
    DataFusionError(#[from] DataFusionError),
}
